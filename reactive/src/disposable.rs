/// Anything holding live subscriptions.
///
/// `dispose` releases them synchronously: once it returns, no callback owned
/// by the disposed value runs again. Calling it twice is a no-op.
pub trait Disposable {
    fn dispose(&self);
}
