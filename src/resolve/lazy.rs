//! Iterator adapters that postpone service calls until the first pull.

use std::mem;
use std::vec;

use crate::cloud::{Host, HostnameAttribute, InstanceRecord};

use super::ResolveError;

enum State<F, I> {
    Pending(F),
    Running(I),
    Finished,
}

/// Runs `start` on the first call to `next`, then drains the iterator it
/// returned. Fused after exhaustion or the first error.
pub(crate) struct Deferred<F, I> {
    state: State<F, I>,
}

impl<F, I> Deferred<F, I>
where
    F: FnOnce() -> Result<I, ResolveError>,
    I: Iterator<Item = Result<Host, ResolveError>>,
{
    pub(crate) const fn new(start: F) -> Self {
        Self {
            state: State::Pending(start),
        }
    }
}

impl<F, I> Iterator for Deferred<F, I>
where
    F: FnOnce() -> Result<I, ResolveError>,
    I: Iterator<Item = Result<Host, ResolveError>>,
{
    type Item = Result<Host, ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut inner = match mem::replace(&mut self.state, State::Finished) {
            State::Pending(start) => match start() {
                Ok(inner) => inner,
                Err(err) => return Some(Err(err)),
            },
            State::Running(inner) => inner,
            State::Finished => return None,
        };
        match inner.next() {
            Some(Ok(host)) => {
                self.state = State::Running(inner);
                Some(Ok(host))
            }
            other => other,
        }
    }
}

/// Projects each instance record onto the selected hostname attribute.
pub(crate) struct Projection {
    instances: vec::IntoIter<InstanceRecord>,
    attribute: HostnameAttribute,
}

impl Projection {
    pub(crate) fn new(instances: Vec<InstanceRecord>, attribute: HostnameAttribute) -> Self {
        Self {
            instances: instances.into_iter(),
            attribute,
        }
    }
}

impl Iterator for Projection {
    type Item = Result<Host, ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.instances.next()?;
        Some(
            record
                .attribute(self.attribute)
                .map(Host::from)
                .ok_or_else(|| ResolveError::MissingAttribute {
                    instance_id: record.instance_id.clone(),
                    attribute: self.attribute,
                }),
        )
    }
}
