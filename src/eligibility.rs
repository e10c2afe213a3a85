use harvest_client::QueryDescriptor;

use crate::SkipReason;

/// Why `descriptor` must not be fetched automatically, if it must not.
///
/// `sink_has_output` reports whether a previous run already saved the query;
/// it is consulted only for queries without required arguments.
pub fn ineligibility<F>(descriptor: &QueryDescriptor, sink_has_output: F) -> Option<SkipReason>
where
    F: FnOnce(&str) -> bool,
{
    if descriptor.has_required_args() {
        Some(SkipReason::RequiresArgs)
    } else if sink_has_output(&descriptor.name) {
        Some(SkipReason::Exists)
    } else {
        None
    }
}

pub fn is_eligible<F>(descriptor: &QueryDescriptor, sink_has_output: F) -> bool
where
    F: FnOnce(&str) -> bool,
{
    ineligibility(descriptor, sink_has_output).is_none()
}
