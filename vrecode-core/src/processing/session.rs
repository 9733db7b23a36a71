//! Scoped ownership of decode sources and encode sinks.
//!
//! A [`SessionGuard`] releases its resource exactly once: either through an
//! explicit [`SessionGuard::release`] call or when it is dropped. Release
//! failures are logged and swallowed so they never replace the result of the
//! work that used the resource.

use crate::error::CoreResult;
use crate::external::{DecodeSource, EncodeSink};

/// Release function stored by a guard.
pub type ReleaseFn<R> = fn(&mut R) -> CoreResult<()>;

/// Owns a resource and guarantees its release.
pub struct SessionGuard<R> {
    label: &'static str,
    resource: R,
    release: ReleaseFn<R>,
    released: bool,
}

impl<R> SessionGuard<R> {
    pub fn new(label: &'static str, resource: R, release: ReleaseFn<R>) -> Self {
        Self {
            label,
            resource,
            release,
            released: false,
        }
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.resource
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Releases the resource now. Later calls and the eventual drop do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        log::debug!("Releasing {}", self.label);
        if let Err(e) = (self.release)(&mut self.resource) {
            log::warn!("Failed to release {}: {}", self.label, e);
        }
    }
}

impl<R> Drop for SessionGuard<R> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S: DecodeSource> SessionGuard<S> {
    /// Guards a decode source, closing it on release.
    pub fn source(source: S) -> Self {
        Self::new("decode source", source, |s| s.close())
    }
}

impl<K: EncodeSink> SessionGuard<K> {
    /// Guards an encode sink, finalizing it on release.
    pub fn sink(sink: K) -> Self {
        Self::new("encode sink", sink, |k| k.close())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Probe {
        log: Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
        fail: bool,
    }

    fn release_probe(p: &mut Probe) -> CoreResult<()> {
        p.log.borrow_mut().push(p.name);
        if p.fail {
            Err(CoreError::OperationFailed(format!("{} failed", p.name)))
        } else {
            Ok(())
        }
    }

    fn probe(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str, fail: bool) -> SessionGuard<Probe> {
        SessionGuard::new(
            name,
            Probe {
                log: Rc::clone(log),
                name,
                fail,
            },
            release_probe,
        )
    }

    #[test]
    fn explicit_release_happens_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut guard = probe(&log, "sink", false);
        guard.release();
        guard.release();
        assert!(guard.is_released());
        drop(guard);
        assert_eq!(*log.borrow(), ["sink"]);
    }

    #[test]
    fn drop_releases_in_reverse_declaration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let _source = probe(&log, "source", false);
            let _sink = probe(&log, "sink", false);
        }
        assert_eq!(*log.borrow(), ["sink", "source"]);
    }

    #[test]
    fn release_failure_is_swallowed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut guard = probe(&log, "sink", true);
        guard.release();
        assert!(guard.is_released());
        assert_eq!(*log.borrow(), ["sink"]);
    }
}
