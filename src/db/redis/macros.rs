/// Read-through caching for an optional Redis cache.
///
/// Looks the key up in the cache (a failing cache counts as a miss). On a hit
/// the cached value is returned. On a miss, or when no cache is configured,
/// the future is awaited, its value is queued for a background cache write and
/// then returned. Errors of the future propagate with `?`.
///
/// # Arguments
/// * `$cache`: an `Option<Cache>`.
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) for the value.
/// * `$ttl`: time-to-live of the cached value in seconds.
/// * `$fetch`: future yielding `AppResult<T>` that computes the value.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Movie(id), MOVIE_CACHE_TTL, self.request_movie(id))
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $fetch:expr) => {{
        let cache = $cache.as_ref();
        let key = $key;
        let hit = match cache {
            Some(cache) => cache.get_or_miss(&key).await,
            None => None,
        };
        if let Some(cached) = hit {
            Ok(cached)
        } else {
            let value = $fetch.await?;
            if let Some(cache) = cache {
                cache.set_in_background(&key, &value, $ttl);
            }
            Ok(value)
        }
    }};
}
