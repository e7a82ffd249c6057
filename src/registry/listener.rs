use crate::error::ListenerError;
use crate::model::ChangeEvent;

/// Subscriber to registry changes.
///
/// Listeners run on the thread that registered or removed the module. A
/// failing or panicking listener is logged and skipped; it never affects
/// the store or the other listeners.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &ChangeEvent) -> Result<(), ListenerError>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> ChangeListener for F
where
    F: Fn(&ChangeEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_change(&self, event: &ChangeEvent) -> Result<(), ListenerError> {
        self(event)
    }
}
