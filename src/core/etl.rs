use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline's three phases in order, logging each one.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn run(&self) -> Result<P::Output> {
        tracing::info!("🚀 Starting pipeline");
        self.monitor.log_stats("start");

        tracing::debug!("📥 Extracting district records");
        let records = self.pipeline.extract()?;
        tracing::info!("📥 Extracted {} records", records.len());
        self.monitor.log_stats("extract");

        tracing::debug!("🔄 Transforming");
        let transformed = self.pipeline.transform(records)?;
        self.monitor.log_stats("transform");

        tracing::debug!("💾 Loading");
        let output = self.pipeline.load(transformed)?;
        self.monitor.log_stats("load");

        self.monitor.log_final_stats();
        tracing::info!("✅ Pipeline finished");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DistrictRecord;
    use crate::utils::error::AnalyzerError;
    use std::cell::RefCell;

    struct CountingPipeline {
        phases: RefCell<Vec<&'static str>>,
        fail_transform: bool,
    }

    impl Pipeline for CountingPipeline {
        type Transformed = usize;
        type Output = String;

        fn extract(&self) -> Result<Vec<DistrictRecord>> {
            self.phases.borrow_mut().push("extract");
            Ok(vec![DistrictRecord::default(); 3])
        }

        fn transform(&self, records: Vec<DistrictRecord>) -> Result<usize> {
            self.phases.borrow_mut().push("transform");
            if self.fail_transform {
                return Err(AnalyzerError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(records.len())
        }

        fn load(&self, count: usize) -> Result<String> {
            self.phases.borrow_mut().push("load");
            Ok(format!("{} records", count))
        }
    }

    #[test]
    fn test_phases_run_in_order() {
        let engine = EtlEngine::new(CountingPipeline {
            phases: RefCell::new(Vec::new()),
            fail_transform: false,
        });
        assert_eq!(engine.run().unwrap(), "3 records");
        assert_eq!(
            *engine.pipeline().phases.borrow(),
            vec!["extract", "transform", "load"]
        );
    }

    #[test]
    fn test_failure_stops_later_phases() {
        let engine = EtlEngine::new(CountingPipeline {
            phases: RefCell::new(Vec::new()),
            fail_transform: true,
        });
        assert!(engine.run().is_err());
        assert_eq!(*engine.pipeline().phases.borrow(), vec!["extract", "transform"]);
    }
}
