use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub text: String,
    pub created: Instant,
}

/// Short-lived messages shown in the corner of the window
pub struct Notifications {
    items: VecDeque<Notice>,
    lifetime: Duration,
    next_id: u64,
}

impl Notifications {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            lifetime,
            next_id: 0,
        }
    }

    pub fn push(&mut self, level: NoticeLevel, text: impl Into<String>, now: Instant) -> u64 {
        let text = text.into();
        match level {
            NoticeLevel::Error => log::error!("{}", text),
            NoticeLevel::Warning => log::warn!("{}", text),
            NoticeLevel::Success | NoticeLevel::Info => log::info!("{}", text),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(Notice {
            id,
            level,
            text,
            created: now,
        });
        id
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Success, text, Instant::now());
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Info, text, Instant::now());
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Warning, text, Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Error, text, Instant::now());
    }

    pub fn expire(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.items
            .retain(|notice| now.saturating_duration_since(notice.created) < lifetime);
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|notice| notice.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
