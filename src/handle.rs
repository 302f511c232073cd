//! Lazily constructed live client

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use crate::{config::ConnectionConfig, error::InfluxError, InfluxClient, InfluxResult};

#[derive(Debug)]
enum HandleState {
    Uninitialized,
    Open(InfluxClient),
    Closed,
}

/// 持有唯一的 live 客户端。第一次调用 [`ClientHandle::get`] 时构造，之后复用。
///
/// 构造过程在互斥锁内完成，并发的首次调用只会构造一个客户端，
/// 也不会看到构造到一半的客户端
#[derive(Debug)]
pub struct ClientHandle {
    config: ConnectionConfig,
    state: Mutex<HandleState>,
    constructed: AtomicUsize,
}

impl ClientHandle {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HandleState::Uninitialized),
            constructed: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn lock_state(&self) -> MutexGuard<'_, HandleState> {
        // 状态只会被整体替换，锁中毒时其中的值仍然有效
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 返回已经打开的客户端，如果还没有构造则先构造。构造失败时返回 `ClientInitError`，
    /// 下一次调用会重新尝试构造
    pub fn get(&self) -> InfluxResult<InfluxClient> {
        let mut state = self.lock_state();

        match &*state {
            HandleState::Open(client) => return Ok(client.clone()),
            HandleState::Closed => return Err(InfluxError::Closed),
            HandleState::Uninitialized => {}
        }

        let client = InfluxClient::from_config(&self.config)?;
        self.constructed.fetch_add(1, Ordering::SeqCst);
        log::info!("InfluxDB 3 Core client initialized for {}", client.endpoint());

        *state = HandleState::Open(client.clone());
        Ok(client)
    }

    /// 幂等。没有调用过 `get` 时也可以安全调用。关闭之后 `get` 返回 [`InfluxError::Closed`]
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.lock_state(), HandleState::Closed);

        if let HandleState::Open(client) = previous {
            client.close();
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(&*self.lock_state(), HandleState::Open(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(&*self.lock_state(), HandleState::Closed)
    }

    /// 到目前为止构造过的客户端数量，正常情况下不会超过 1
    pub fn constructed_count(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }
}
