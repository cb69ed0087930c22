//! Capabilities the session is constructed with
//!
//! The session never reaches for global state: attach changes go to an
//! [`AttachObserver`] and frame dumps go to an optional [`FrameTap`].

use qmi_codec::dump;

/// Receives coarse attach/detach transitions
///
/// Called only when the modem goes from no service to some service or back;
/// a handover between technologies is not reported.
pub trait AttachObserver {
    fn attach_changed(&mut self, has_service: bool);
}

impl<T: AttachObserver + ?Sized> AttachObserver for &mut T {
    fn attach_changed(&mut self, has_service: bool) {
        (**self).attach_changed(has_service)
    }
}

impl<T: AttachObserver + ?Sized> AttachObserver for Box<T> {
    fn attach_changed(&mut self, has_service: bool) {
        (**self).attach_changed(has_service)
    }
}

/// Sees every frame the session writes or is handed
pub trait FrameTap {
    fn sent(&self, frame: &[u8]);
    fn received(&self, frame: &[u8]);
}

/// Dumps frames as `tracing` debug events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTap;

impl FrameTap for TracingTap {
    fn sent(&self, frame: &[u8]) {
        dump::trace_frame("sent", frame);
    }

    fn received(&self, frame: &[u8]) {
        dump::trace_frame("received", frame);
    }
}
