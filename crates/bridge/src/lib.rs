//! # Bridge
//!
//! 服务实例：持有配置、Dispatch Queue 与 broker client。
//!
//! ## 生命周期
//!
//! `Created → Running → Stopping → Stopped`
//!
//! - `start()`: 选择编码器、绑定 HTTP 监听、启动 publish loop
//! - `stop()`: 关闭入口与队列、在 drain 超时内排空并关闭 broker client
//! - `Stopped` 为终态，实例不可复用
//!
//! ```ignore
//! let mut service = BridgeService::new(config, LogBrokerClient::new("log"));
//! let report = service.run_until(shutdown_signal()).await?;
//! println!("{report}");
//! ```

mod error;
mod report;
mod service;
mod state;

pub use error::ServiceError;
pub use report::ShutdownReport;
pub use service::BridgeService;
pub use state::ServiceState;
