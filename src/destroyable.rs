/// Implemented by owners of subscriptions or scheduled tasks that must be
/// released explicitly; `Rc` cycles through channel callbacks are never
/// collected on their own.
pub trait Destroyable {
    fn destroy(&mut self);
}
