use crate::types::DisplayMode;

/// Host-side surface that shows a built widget url, e.g. a sheet or window
/// wrapping an embedded web view.
pub trait Presenter {
    fn present(&self, url: &str, mode: DisplayMode);
}

impl<P: Presenter + ?Sized> Presenter for &P {
    fn present(&self, url: &str, mode: DisplayMode) {
        (**self).present(url, mode);
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn present(&self, url: &str, mode: DisplayMode) {
        (**self).present(url, mode);
    }
}
