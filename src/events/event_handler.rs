/// Something that folds a stream of events into its own view of the game.
pub trait EventHandler<T> {
    fn handle_event(&mut self, event: &T);
}
