use std::cell::Cell;
use std::rc::Rc;

/// A live media stream whose device tracks can be stopped.
pub trait MediaTracks {
    fn stop_tracks(&self);
}

/// Exclusive owner of an open camera stream.
///
/// Every way out of the camera view goes through this type, so the device
/// is always released: capturing, closing, opening a new stream over an old
/// one, and dropping the session all stop the tracks.
#[derive(Debug)]
pub struct CameraSession<S: MediaTracks> {
    stream: Option<S>,
    pending: Option<Rc<Cell<bool>>>,
}

impl<S: MediaTracks> Default for CameraSession<S> {
    fn default() -> Self {
        Self {
            stream: None,
            pending: None,
        }
    }
}

/// Handed to an outstanding camera request. A stream that arrives after
/// the session was released, dropped or asked again is stopped on arrival.
#[derive(Debug, Clone)]
pub struct PendingCamera {
    wanted: Rc<Cell<bool>>,
}

impl PendingCamera {
    pub fn is_wanted(&self) -> bool {
        self.wanted.get()
    }

    /// Returns the stream when the session still wants it.
    pub fn deliver<S: MediaTracks>(&self, stream: S) -> Option<S> {
        if self.wanted.get() {
            return Some(stream);
        }
        stream.stop_tracks();
        log::info!("Late camera stream stopped on arrival");
        None
    }
}

impl<S: MediaTracks> CameraSession<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// A request is outstanding and no stream is attached yet.
    pub fn is_opening(&self) -> bool {
        self.pending.as_ref().is_some_and(|wanted| wanted.get())
    }

    pub fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    /// Releases any open stream and starts a new request, superseding an
    /// older one still in flight.
    pub fn request(&mut self) -> PendingCamera {
        self.release();
        let wanted = Rc::new(Cell::new(true));
        self.pending = Some(Rc::clone(&wanted));
        PendingCamera { wanted }
    }

    /// Takes ownership of a freshly acquired stream, stopping any stream
    /// that was still open.
    pub fn attach(&mut self, stream: S) {
        if let Some(stream) = self.stream.take() {
            stream.stop_tracks();
        }
        self.pending = None;
        self.stream = Some(stream);
    }

    /// Runs `grab` against the open stream, then stops it. Returns `None`
    /// when no stream is open.
    pub fn capture<T>(&mut self, grab: impl FnOnce(&S) -> T) -> Option<T> {
        let stream = self.stream.take()?;
        let frame = grab(&stream);
        stream.stop_tracks();
        log::info!("Camera frame captured, stream released");
        Some(frame)
    }

    /// Stops the open stream and cancels an outstanding request. Returns
    /// true when a stream was stopped.
    pub fn release(&mut self) -> bool {
        if let Some(wanted) = self.pending.take() {
            wanted.set(false);
        }
        match self.stream.take() {
            Some(stream) => {
                stream.stop_tracks();
                log::info!("Camera stream released");
                true
            }
            None => false,
        }
    }
}

impl<S: MediaTracks> Drop for CameraSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone)]
    struct FakeStream {
        id: u8,
        stopped: Rc<Cell<u32>>,
    }

    impl MediaTracks for FakeStream {
        fn stop_tracks(&self) {
            self.stopped.set(self.stopped.get() + 1);
        }
    }

    fn stream(id: u8, stopped: &Rc<Cell<u32>>) -> FakeStream {
        FakeStream {
            id,
            stopped: Rc::clone(stopped),
        }
    }

    #[test]
    fn capture_stops_tracks() {
        let stopped = Rc::new(Cell::new(0));
        let mut session = CameraSession::new();
        session.attach(stream(1, &stopped));
        assert_eq!(session.capture(|s| s.id), Some(1));
        assert_eq!(stopped.get(), 1);
        assert!(!session.is_active());
        assert_eq!(session.capture(|s| s.id), None);
    }

    #[test]
    fn reopening_releases_previous_stream() {
        let stopped = Rc::new(Cell::new(0));
        let mut session = CameraSession::new();
        session.attach(stream(1, &stopped));
        session.attach(stream(2, &stopped));
        assert_eq!(stopped.get(), 1);
        assert_eq!(session.stream().map(|s| s.id), Some(2));
    }

    #[test]
    fn close_and_drop_release() {
        let stopped = Rc::new(Cell::new(0));
        let mut session = CameraSession::new();
        session.attach(stream(1, &stopped));
        assert!(session.release());
        assert!(!session.release());
        assert_eq!(stopped.get(), 1);

        session.attach(stream(2, &stopped));
        drop(session);
        assert_eq!(stopped.get(), 2);
    }

    #[test]
    fn stream_arriving_after_drop_is_stopped() {
        let stopped = Rc::new(Cell::new(0));
        let mut session: CameraSession<FakeStream> = CameraSession::new();
        let pending = session.request();
        assert!(session.is_opening());
        drop(session);

        assert!(!pending.is_wanted());
        assert!(pending.deliver(stream(1, &stopped)).is_none());
        assert_eq!(stopped.get(), 1);
    }

    #[test]
    fn cancel_while_opening_stops_late_stream() {
        let stopped = Rc::new(Cell::new(0));
        let mut session: CameraSession<FakeStream> = CameraSession::new();
        let pending = session.request();
        assert!(!session.release());
        assert!(!session.is_opening());
        assert!(pending.deliver(stream(1, &stopped)).is_none());
        assert_eq!(stopped.get(), 1);
        assert!(!session.is_active());
    }

    #[test]
    fn newer_request_supersedes_older() {
        let stopped = Rc::new(Cell::new(0));
        let mut session = CameraSession::new();
        let first = session.request();
        let second = session.request();
        assert!(first.deliver(stream(1, &stopped)).is_none());

        let delivered = second.deliver(stream(2, &stopped)).unwrap();
        session.attach(delivered);
        assert_eq!(stopped.get(), 1);
        assert!(!session.is_opening());
        assert_eq!(session.stream().map(|s| s.id), Some(2));
    }
}
