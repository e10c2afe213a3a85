use tower::Service;

/// Swaps a fresh clone into `src` and hands back the instance that was just
/// driven to readiness, so the ready one is the one that gets called.
///
/// See <https://docs.rs/tower/latest/tower/trait.Service.html#be-careful-when-cloning-inner-services>
pub fn replace_ready_service<S, T>(src: &mut S) -> S
where
    S: Service<T> + Clone,
{
    let clone = src.clone();
    std::mem::replace(src, clone)
}
