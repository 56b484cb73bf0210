/// Application name
pub const APP_NAME: &str = "Palaver";

/// Number of messages fetched per "load older" request
pub const MESSAGES_PER_PAGE: usize = 20;

/// Number of history pages the simulated source can serve before it is exhausted
pub const HISTORY_PAGE_CEILING: u32 = 5;

/// Simulated latency of a history fetch in milliseconds
pub const HISTORY_LATENCY_MS: u64 = 1_000;

/// How long the assistant "types" before its reply lands, in milliseconds
pub const AI_RESPONSE_DELAY_MS: u64 = 2_000;

/// Minimum time between accepted assistant-reply triggers, in milliseconds
pub const AI_THROTTLE_INTERVAL_MS: u64 = 3_000;

/// Quiet period before a search query is applied, in milliseconds
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Maximum decoded size of an attached image (5 MiB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// MIME types accepted for image attachments
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Chatroom preview shown when the last message carries only an image
pub const IMAGE_PREVIEW_TEXT: &str = "Image";

/// Canned assistant replies.
pub const AI_RESPONSES: [&str; 10] = [
    "That's an interesting question! Let me think about that...",
    "I understand what you're asking. Here's my perspective on that topic...",
    "Great point! I'd be happy to help you with that.",
    "That's a thoughtful question. Let me provide you with some insights...",
    "I see what you mean. Here's how I would approach this...",
    "Thanks for sharing that with me. I think we can explore this further...",
    "That's a fascinating topic! There are several ways to look at this...",
    "I appreciate you bringing this up. Let me share some thoughts...",
    "Good question! This is something I've been thinking about too...",
    "I'm glad you asked about this. Here's what I think...",
];

/// Titles handed to chatrooms created without one.
pub const SAMPLE_CHATROOM_NAMES: [&str; 10] = [
    "General Discussion",
    "Project Planning",
    "Creative Ideas",
    "Tech Talk",
    "Random Thoughts",
    "Daily Standup",
    "Brainstorming",
    "Quick Questions",
    "Deep Dive",
    "Casual Chat",
];

/// Message bodies used by the simulated history source.
pub const SAMPLE_HISTORY_TEXTS: [&str; 10] = [
    "Hello there! How are you doing today?",
    "I've been working on this project and would love your feedback.",
    "What do you think about the latest updates?",
    "Can you help me understand this concept better?",
    "That's a great point! I hadn't thought of it that way.",
    "Let me share some insights on this topic.",
    "I'm excited about the possibilities this opens up.",
    "Thanks for the detailed explanation!",
    "This is really helpful information.",
    "I agree with your assessment completely.",
];
