/// Wraps a computation in the optional response cache.
///
/// With `Some(cache)`, a hit returns the cached value and a miss runs
/// `$block`, queues the result for storage and returns it. With `None` the
/// block simply runs. Errors from `$block` are propagated with `?` and never
/// cached.
///
/// # Example
/// ```rust,ignore
/// let items: Vec<Item> = cached!(state.cache, key, ttl, async {
///     service.recommend_items(user_id, limit).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match &$cache {
            Some(cache) => match cache.get_from_cache(&$key).await {
                Some(hit) => Ok(hit),
                None => {
                    let value = $block.await?;
                    cache.set_in_background(&$key, &value, $ttl);
                    Ok(value)
                }
            },
            None => $block.await,
        }
    }};
}
