use crate::destroyable::Destroyable;
use crate::events::{EventHandler, EventObserver, Unsubscriber};
use crate::model::{GameEngineEvent, GameStateSnapshot, RoundSummary, SessionSummary};
use std::cell::RefCell;
use std::rc::Rc;

/// Keeps the latest engine-published view for a presentation layer that
/// only listens to events.
#[derive(Default)]
pub struct RoundProjection {
    round: Option<GameStateSnapshot>,
    last_summary: Option<RoundSummary>,
    session_summary: Option<SessionSummary>,
    last_rejection: Option<String>,
    offline: bool,
    persistence_degraded: bool,
    subscription: Option<Unsubscriber<GameEngineEvent>>,
}

impl Destroyable for RoundProjection {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl RoundProjection {
    pub fn new(observer: &EventObserver<GameEngineEvent>) -> Rc<RefCell<Self>> {
        let projection = Rc::new(RefCell::new(Self::default()));
        let handler = Rc::downgrade(&projection);
        let subscription = observer.subscribe_with_handle(move |event| {
            if let Some(projection) = handler.upgrade() {
                projection.borrow_mut().handle_event(event);
            }
        });
        projection.borrow_mut().subscription = Some(subscription);
        projection
    }

    pub fn round(&self) -> Option<&GameStateSnapshot> {
        self.round.as_ref()
    }

    pub fn last_summary(&self) -> Option<&RoundSummary> {
        self.last_summary.as_ref()
    }

    pub fn session_summary(&self) -> Option<&SessionSummary> {
        self.session_summary.as_ref()
    }

    pub fn last_rejection(&self) -> Option<&str> {
        self.last_rejection.as_deref()
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn is_persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }
}

impl EventHandler<GameEngineEvent> for RoundProjection {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        match event {
            GameEngineEvent::RoundStarted(snapshot) => {
                self.round = Some(snapshot.clone());
                self.last_rejection = None;
                self.session_summary = None;
            }
            GameEngineEvent::RoundUpdated(snapshot) => {
                self.round = Some(snapshot.clone());
                self.last_rejection = None;
            }
            GameEngineEvent::GuessRejected(reason) => {
                self.last_rejection = Some(reason.to_string());
            }
            GameEngineEvent::RoundFinished(summary) => {
                self.last_summary = Some(summary.clone());
            }
            GameEngineEvent::SessionEnded(summary) => {
                self.session_summary = Some(summary.clone());
            }
            GameEngineEvent::OfflineModeChanged(offline) => self.offline = *offline,
            GameEngineEvent::PersistenceDegraded(_) => self.persistence_degraded = true,
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::events::Channel;

    #[test]
    fn test_projection_tracks_events_until_destroyed() {
        let (emitter, observer) = Channel::<GameEngineEvent>::new();
        let projection = RoundProjection::new(&observer);

        emitter.emit(&GameEngineEvent::GuessRejected(InputError::Digit));
        emitter.emit(&GameEngineEvent::OfflineModeChanged(true));
        assert_eq!(
            projection.borrow().last_rejection(),
            Some("numbers are not letters")
        );
        assert!(projection.borrow().is_offline());

        projection.borrow_mut().destroy();
        emitter.emit(&GameEngineEvent::OfflineModeChanged(false));
        assert!(projection.borrow().is_offline());
        assert_eq!(observer.listener_count(), 0);
    }
}
