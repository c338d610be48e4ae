/// Time a block and print the elapsed duration, returning the block's value.
#[macro_export]
macro_rules! profile {
    ($description:expr, $block:expr) => {{
        let start = std::time::Instant::now();
        let result = $block;
        let duration = start.elapsed();
        tracing::debug!("[{}]: Time elapsed: {:?}", $description, duration);
        result
    }};
}
