//! Background execution of remote calls.
//!
//! The UI thread never waits on the network. Each [`Request`] is spawned as
//! a task on a small tokio runtime; the task sends exactly one
//! [`Settlement`] back through an unbounded channel, which the UI loop
//! drains with `try_recv` on every tick.

use std::future::Future;
use std::io;
use std::sync::Arc;

use log::debug;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::gateway::Gateway;
use crate::workspace::{Request, Settlement};

/// Number of runtime worker threads; requests are I/O bound.
const WORKER_THREADS: usize = 2;

/// Runs requests in the background and collects their settlements.
pub struct Dispatcher {
    runtime: Runtime,
    gateway: Arc<Gateway>,
    tx: UnboundedSender<Settlement>,
    rx: UnboundedReceiver<Settlement>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(gateway: Gateway) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(WORKER_THREADS)
            .thread_name("genovista-io")
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime,
            gateway: Arc::new(gateway),
            tx,
            rx,
            in_flight: 0,
        })
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Spawns one request.
    pub fn dispatch(&mut self, request: Request) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        self.in_flight += 1;
        debug!("Dispatching {:?}", request.purpose);
        self.runtime.spawn(async move {
            let Request { purpose, call } = request;
            let outcome = gateway.execute(call).await;
            // The receiver only goes away on shutdown.
            let _ = tx.send(Settlement { purpose, outcome });
        });
    }

    pub fn dispatch_all(&mut self, requests: Vec<Request>) {
        for request in requests {
            self.dispatch(request);
        }
    }

    /// Collects every settlement that has arrived, without blocking.
    pub fn drain(&mut self) -> Vec<Settlement> {
        let mut settled = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(settlement) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    settled.push(settlement);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        settled
    }

    /// Requests spawned but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Runs a future to completion on the dispatcher's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
