//! Canned message/context pairs for a quick start.

use crate::error::AppError;

/// A ready-made scenario that fills both input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// A manager asking for a late project update.
    Work,
    /// A friend upset about cancelled plans.
    Friend,
    /// An angry customer with a damaged order.
    Customer,
}

impl Template {
    /// All templates in display order.
    pub const ALL: [Template; 3] = [Template::Work, Template::Friend, Template::Customer];

    /// Look up a template by name.
    pub fn lookup(name: &str) -> Result<Template, AppError> {
        match name.trim().to_lowercase().as_str() {
            "work" => Ok(Template::Work),
            "friend" => Ok(Template::Friend),
            "customer" => Ok(Template::Customer),
            other => Err(AppError::validation(format!(
                "Unknown template '{}' (expected work, friend or customer)",
                other
            ))),
        }
    }

    /// Template name.
    pub fn name(&self) -> &'static str {
        match self {
            Template::Work => "work",
            Template::Friend => "friend",
            Template::Customer => "customer",
        }
    }

    /// The incoming message.
    pub fn message(&self) -> &'static str {
        match self {
            Template::Work => "Hi team,\n\nJust checking in on the status of Project Phoenix. We're a bit behind schedule and I need an update for the leadership meeting on Friday. What's the new ETA?\n\nThanks,\nSarah",
            Template::Friend => "Hey, was pretty bummed you cancelled on Saturday. Is everything okay?",
            Template::Customer => "This is UNACCEPTABLE! My order A-123 arrived completely smashed. I paid good money for this and I want a refund IMMEDIATELY. This is the worst service I've ever received.",
        }
    }

    /// The context and goal.
    pub fn context(&self) -> &'static str {
        match self {
            Template::Work => "This is from my manager, Sarah. She's asking for an update on Project Phoenix, which is running late. My goal is to sound responsible, acknowledge the delay, but confidently set a new, realistic timeline.",
            Template::Friend => "This is from my friend, Alex. They seem upset that I cancelled our plans last weekend. My goal is to validate their feelings, apologize sincerely, and find a good time to reschedule.",
            Template::Customer => "This is from an angry customer, John Doe. Their order (A-123) arrived damaged. My goal is to de-escalate their anger, show empathy, and provide a clear, immediate solution.",
        }
    }
}

impl std::str::FromStr for Template {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::lookup(s)
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
