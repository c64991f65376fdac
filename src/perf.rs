use std::cell::Cell;
use std::sync::OnceLock;
use std::time::Instant;

static PERF_ENABLED: OnceLock<bool> = OnceLock::new();

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 阶段耗时日志开关
///
/// - Debug 默认开启；Release 默认关闭
/// - `MATERIAL_REQUIREMENT_PERF=1` 强制开启，`=0` 强制关闭
pub fn perf_enabled() -> bool {
    *PERF_ENABLED.get_or_init(|| match std::env::var("MATERIAL_REQUIREMENT_PERF") {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    })
}

/// 当前线程上未释放的 PerfGuard 数量
#[cfg(test)]
pub(crate) fn current_depth() -> u32 {
    PERF_DEPTH.with(|d| d.get())
}

/// 性能统计 Guard：drop 时记录 elapsed_ms 与嵌套深度
///
/// 使用方式：
/// ```ignore
/// let _perf = material_requirement::perf::PerfGuard::new("aggregate");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    depth: u32,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let depth = PERF_DEPTH.with(|d| {
            let depth = d.get();
            d.set(depth.saturating_add(1));
            depth
        });
        Self {
            op,
            start: Instant::now(),
            depth,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;

        if perf_enabled() {
            tracing::info!(target: "perf", op = self.op, elapsed_ms, depth = self.depth, "done");
        } else {
            tracing::debug!(target: "perf", op = self.op, elapsed_ms, depth = self.depth, "done");
        }

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_true() {
        assert!(is_true(" Yes "));
        assert!(is_true("1"));
        assert!(!is_true("off"));
    }

    #[test]
    fn test_nested_guards_restore_depth() {
        {
            let outer = PerfGuard::new("outer");
            let inner = PerfGuard::new("inner");
            assert_eq!(outer.depth, 0);
            assert_eq!(inner.depth, 1);
        }
        assert_eq!(current_depth(), 0);
    }
}
