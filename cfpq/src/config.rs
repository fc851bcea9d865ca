//! Closure engine configuration

use cfpq_core::MultiplyOptions;

/// Configuration for a closure run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureConfig {
    /// Worker threads for a dedicated pool; `None` uses the global rayon pool
    pub threads: Option<usize>,
    /// Allow row-parallel multiplication
    pub parallel: bool,
    /// Matrices with fewer rows than this are multiplied sequentially
    pub parallel_row_threshold: usize,
    /// Lower bound on rows per parallel task
    pub min_rows_per_task: usize,
}

impl ClosureConfig {
    /// Config that keeps every multiplication on the calling thread
    pub fn sequential() -> Self {
        Self {
            threads: None,
            parallel: false,
            ..Self::default()
        }
    }

    /// Run passes inside a dedicated pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the row count at which multiplication goes parallel
    pub fn with_parallel_row_threshold(mut self, rows: usize) -> Self {
        self.parallel_row_threshold = rows;
        self
    }

    /// Set the minimum rows handed to one parallel task
    pub fn with_min_rows_per_task(mut self, rows: usize) -> Self {
        self.min_rows_per_task = rows.max(1);
        self
    }

    /// Kernel options derived from this config
    pub fn multiply_options(&self) -> MultiplyOptions {
        MultiplyOptions {
            parallel: self.parallel,
            parallel_row_threshold: self.parallel_row_threshold,
            min_rows_per_task: self.min_rows_per_task,
        }
    }

    /// Pick a parallel threshold from the graph shape
    ///
    /// Very sparse graphs gain little from splitting small matrices, so the
    /// threshold rises as average degree falls.
    pub fn optimal_parallel_threshold(node_count: usize, edge_count: usize) -> usize {
        if node_count == 0 {
            return MultiplyOptions::default().parallel_row_threshold;
        }
        let degree = edge_count as f64 / node_count as f64;
        if degree < 1.0 {
            4096
        } else if degree > 16.0 {
            256
        } else {
            1024
        }
    }
}

impl Default for ClosureConfig {
    fn default() -> Self {
        let options = MultiplyOptions::default();
        Self {
            threads: None,
            parallel: options.parallel,
            parallel_row_threshold: options.parallel_row_threshold,
            min_rows_per_task: options.min_rows_per_task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClosureConfig::default()
            .with_threads(2)
            .with_parallel_row_threshold(10)
            .with_min_rows_per_task(0);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.min_rows_per_task, 1);

        let options = config.multiply_options();
        assert!(options.use_parallel(10));
        assert!(!options.use_parallel(9));
    }

    #[test]
    fn test_sequential() {
        let options = ClosureConfig::sequential().multiply_options();
        assert!(!options.use_parallel(usize::MAX));
    }

    #[test]
    fn test_optimal_parallel_threshold() {
        assert_eq!(ClosureConfig::optimal_parallel_threshold(100, 10), 4096);
        assert_eq!(ClosureConfig::optimal_parallel_threshold(100, 400), 1024);
        assert_eq!(ClosureConfig::optimal_parallel_threshold(10, 1000), 256);
        assert_eq!(ClosureConfig::optimal_parallel_threshold(0, 0), 1024);
    }
}
