use crate::core::commands::StageCommand;
use crate::core::transform::{transform_stream, LineTransformer};
use crate::utils::error::{EtlError, Result};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::task::JoinError;

pub const TRANSFORM_STAGE: &str = "transform";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub rows: u64,
    pub elapsed: Duration,
}

enum StageEvent {
    Producer(std::io::Result<ExitStatus>),
    Consumer(std::io::Result<ExitStatus>),
    Transform(std::result::Result<Result<u64>, JoinError>),
}

/// Runs `producer | transform | consumer` for one table.
///
/// The producer's stdout is fed line by line through the [`LineTransformer`]
/// into the consumer's stdin. All three stages run concurrently. When any of
/// them fails the remaining ones are killed (or aborted), and `run` returns
/// the first failure only after every stage has finished.
pub struct PipelineRunner {
    transformer: Arc<LineTransformer>,
}

impl PipelineRunner {
    pub fn new(transformer: LineTransformer) -> Self {
        Self {
            transformer: Arc::new(transformer),
        }
    }

    pub async fn run(&self, producer: &StageCommand, consumer: &StageCommand) -> Result<PipelineStats> {
        let start = Instant::now();
        tracing::debug!("Producer: {}", producer);
        tracing::debug!("Consumer: {}", consumer);

        let mut producer_child = spawn(producer, Stdio::null(), Stdio::piped())?;
        let mut consumer_child = match spawn(consumer, Stdio::piped(), Stdio::inherit()) {
            Ok(child) => child,
            Err(e) => {
                reap(&mut producer_child, &producer.name).await;
                return Err(e);
            }
        };

        let (Some(reader), Some(writer)) = (producer_child.stdout.take(), consumer_child.stdin.take())
        else {
            reap(&mut producer_child, &producer.name).await;
            reap(&mut consumer_child, &consumer.name).await;
            return Err(EtlError::ProcessingError {
                message: "stage pipes were not captured".to_string(),
            });
        };

        let transformer = Arc::clone(&self.transformer);
        let mut transform = tokio::spawn(async move {
            transform_stream(&transformer, BufReader::new(reader), writer).await
        });

        let mut producer_done = false;
        let mut consumer_done = false;
        let mut transform_done = false;
        let mut rows = 0;
        let mut failure: Option<EtlError> = None;

        while !(producer_done && consumer_done && transform_done) {
            let event = tokio::select! {
                status = producer_child.wait(), if !producer_done => StageEvent::Producer(status),
                status = consumer_child.wait(), if !consumer_done => StageEvent::Consumer(status),
                joined = &mut transform, if !transform_done => StageEvent::Transform(joined),
            };

            let outcome = match event {
                StageEvent::Producer(status) => {
                    producer_done = true;
                    check_exit(&producer.name, status)
                }
                StageEvent::Consumer(status) => {
                    consumer_done = true;
                    check_exit(&consumer.name, status)
                }
                StageEvent::Transform(joined) => {
                    transform_done = true;
                    match joined {
                        Ok(Ok(count)) => {
                            tracing::debug!(rows = count, "{} stage finished", TRANSFORM_STAGE);
                            rows = count;
                            Ok(())
                        }
                        Ok(Err(e)) => Err(e),
                        Err(e) if e.is_cancelled() => Ok(()),
                        Err(e) => Err(EtlError::StageAborted {
                            stage: TRANSFORM_STAGE.to_string(),
                            reason: e.to_string(),
                        }),
                    }
                }
            };

            let Err(e) = outcome else { continue };
            if failure.is_some() {
                tracing::debug!("Ignoring failure after teardown: {}", e);
                continue;
            }

            tracing::warn!("Stage failed, stopping the pipeline: {}", e);
            if !producer_done {
                kill(&mut producer_child, &producer.name);
            }
            if !consumer_done {
                kill(&mut consumer_child, &consumer.name);
            }
            if !transform_done {
                transform.abort();
            }
            failure = Some(e);
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(PipelineStats {
                rows,
                elapsed: start.elapsed(),
            }),
        }
    }
}

fn spawn(stage: &StageCommand, stdin: Stdio, stdout: Stdio) -> Result<Child> {
    stage
        .to_command()
        .stdin(stdin)
        .stdout(stdout)
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| EtlError::StageSpawnError {
            stage: stage.name.clone(),
            source,
        })
}

fn check_exit(stage: &str, status: std::io::Result<ExitStatus>) -> Result<()> {
    let status = status?;
    if status.success() {
        tracing::debug!("{} exited successfully", stage);
        Ok(())
    } else {
        Err(EtlError::StageFailure {
            stage: stage.to_string(),
            status,
        })
    }
}

fn kill(child: &mut Child, stage: &str) {
    if let Err(e) = child.start_kill() {
        tracing::debug!("Could not kill {}: {}", stage, e);
    }
}

async fn reap(child: &mut Child, stage: &str) {
    kill(child, stage);
    if let Err(e) = child.wait().await {
        tracing::debug!("Could not reap {}: {}", stage, e);
    }
}
