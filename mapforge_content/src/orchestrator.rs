use std::{any::Any, io, sync::Arc, thread};

use mapforge_shared::{
    crossbeam_channel::{self, Sender},
    log::{debug, error, info},
};

use crate::{
    common::{BuildOutcome, JobError, JobFailure},
    job,
    registry::{BuildRequest, MapDescriptor, MapRegistry},
    terrain::TerrainGenerator,
    AssetLocator, Error, Result,
};

/// Maps that were built by a successful run in the order in which their jobs finished.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildSummary {
    pub built: Vec<MapDescriptor>,
}

/// Builds the selected maps of a [`MapRegistry`] concurrently.
///
/// Every map is built by its own thread. The jobs share nothing but read-only data and write into
/// distinct output directories. Their outcomes are collected through a channel once all of them
/// finished.
pub struct BuildOrchestrator {
    registry: MapRegistry,
    locator: AssetLocator,
    generator: Arc<dyn TerrainGenerator>,
}

impl BuildOrchestrator {
    pub fn new(registry: MapRegistry, locator: AssetLocator, generator: Arc<dyn TerrainGenerator>) -> Self {
        Self {
            registry,
            locator,
            generator,
        }
    }

    /// Builds every map the request selects and waits for all jobs to finish.
    ///
    /// Unknown map names fail the run before any job is started. When jobs fail, the other jobs
    /// still run to completion and keep their outputs. The first failure in completion order is
    /// returned and all failures are logged.
    pub fn build(&self, request: &BuildRequest) -> Result<BuildSummary> {
        let maps = self.registry.resolve(&request.selection)?;
        info!("Building {} maps", maps.len());

        let (outcome_sender, outcome_receiver) = crossbeam_channel::unbounded::<BuildOutcome>();
        let spawn_error = self.run_jobs(&maps, outcome_sender, |_| Ok(()));

        let mut summary = BuildSummary::default();
        let mut failures = Vec::new();
        for outcome in outcome_receiver.iter() {
            match outcome {
                BuildOutcome::Succeeded(map) => summary.built.push(map),
                BuildOutcome::Failed(failure) => {
                    error!("{failure}");
                    failures.push(failure);
                }
            }
        }

        if let Some(spawn_error) = spawn_error {
            return Err(spawn_error);
        }

        let mut failures = failures.into_iter();
        match failures.next() {
            None => {
                info!("Built {} maps", summary.built.len());
                Ok(summary)
            }
            Some(failure) => {
                let others = failures.len();
                error!("{} of {} maps failed to build", others + 1, maps.len());
                Err(Error::JobFailed { failure, others })
            }
        }
    }
}

impl BuildOrchestrator {
    /// Runs one job per map and reports every outcome through `outcome_sender`.
    ///
    /// `admit` is asked before each thread is started. When a job cannot be started, no further
    /// jobs are started, the running ones are joined and the error is returned.
    fn run_jobs<A>(&self, maps: &[MapDescriptor], outcome_sender: Sender<BuildOutcome>, admit: A) -> Option<Error>
    where
        A: Fn(MapDescriptor) -> io::Result<()>,
    {
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(maps.len());
            let mut spawn_error = None;
            for map in maps.iter().copied() {
                let job_sender = outcome_sender.clone();
                let locator = &self.locator;
                let generator = self.generator.as_ref();
                debug!("Starting the build job for map {map}");
                let spawned = admit(map).and_then(|()| {
                    thread::Builder::new()
                        .name(format!("build {}", map.name))
                        .spawn_scoped(scope, move || {
                            let outcome = job::run(map, locator, generator);
                            send_outcome(&job_sender, outcome);
                        })
                });
                match spawned {
                    Ok(handle) => handles.push((map, handle)),
                    Err(source) => {
                        error!("Failed to start the build job for map {map}: {source}");
                        spawn_error = Some(Error::FailedToStartJob { map, source });
                        break;
                    }
                }
            }

            // Every started job is joined, so that a panicking job cannot take the run down with it.
            for (map, handle) in handles {
                if let Err(payload) = handle.join() {
                    let error = JobError::Panicked(panic_message(payload.as_ref()));
                    send_outcome(&outcome_sender, BuildOutcome::Failed(JobFailure { map, error }));
                }
            }
            spawn_error
        })
    }
}

fn send_outcome(sender: &Sender<BuildOutcome>, outcome: BuildOutcome) {
    if let Err(err) = sender.send(outcome) {
        error!("Failed to report the outcome of the build job for map {}", err.0.map());
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
