use async_trait::async_trait;

/// Outbound notification sink. Strictly best-effort: implementations log
/// delivery failures and never surface them to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str);
}

/// Sink that drops every message. Used in tests and when no Telegram
/// credentials are configured.
#[derive(Debug, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _text: &str) {}
}
