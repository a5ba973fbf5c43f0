//! # Dispatcher
//!
//! 数据分发模块。
//!
//! 负责：
//! - Dispatch Queue：多个请求处理器 → 单个 publish loop 的无缓冲交接
//! - Publish Loop：按交接顺序编码并发送到 broker client
//! - Broker clients：Log / Memory / Kafka (`kafka` feature)

pub mod clients;
pub mod error;
pub mod metrics;
pub mod producer;
pub mod publish_loop;
pub mod queue;

pub use clients::{LogBrokerClient, MemoryBrokerClient, SentMessage};
#[cfg(feature = "kafka")]
pub use clients::KafkaBrokerClient;
pub use contracts::{BrokerClient, Envelope};
pub use error::DispatchError;
pub use metrics::{PublishMetrics, PublishSnapshot};
pub use producer::{PreparedRecord, Producer};
pub use publish_loop::PublishLoop;
pub use queue::{dispatch_queue, DispatchReceiver, DispatchSender, Submission};
