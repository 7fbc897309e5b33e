// ── Command API ──
//
// Every operation that asks the daemon to change something goes through
// `Command`. The target is resolved against the cache first, so a
// command for an unknown entity fails locally without a round trip.

use strum::IntoStaticStr;
use tracing::{debug, info, warn};

use nearfield_api::{Directory, Interface, MethodCall, PropertyValue, error_name, method};

use crate::context::Context;
use crate::convert::adapter_key;
use crate::error::CoreError;
use crate::model::{AdapterPath, DevicePath, PollMode, RecordFields, TagPath};

/// All write operations against the daemon.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum Command {
    // ── Adapter operations ───────────────────────────────────────────
    StartPoll { adapter: AdapterPath, mode: PollMode },
    StopPoll { adapter: AdapterPath },
    SetPowered { adapter: AdapterPath, powered: bool },

    // ── Record transfer ──────────────────────────────────────────────
    WriteRecord { tag: TagPath, fields: RecordFields },
    PushRecord { device: DevicePath, fields: RecordFields },
}

impl Command {
    fn target(&self) -> &str {
        match self {
            Self::StartPoll { adapter, .. }
            | Self::StopPoll { adapter }
            | Self::SetPowered { adapter, .. } => adapter.as_str(),
            Self::WriteRecord { tag, .. } => tag.as_str(),
            Self::PushRecord { device, .. } => device.as_str(),
        }
    }
}

impl<D: Directory> Context<D> {
    // ── Command execution ────────────────────────────────────────────

    /// Execute a command against the daemon.
    ///
    /// Blocks until the daemon replies. Failures are never retried.
    pub fn execute(&mut self, cmd: Command) -> Result<(), CoreError> {
        if cmd.target().is_empty() {
            return Err(CoreError::invalid_parameter("empty object path"));
        }
        let name: &'static str = (&cmd).into();
        debug!(command = name, target = cmd.target(), "executing command");

        match cmd {
            Command::StartPoll { adapter, mode } => self.route_start_poll(&adapter, mode),
            Command::StopPoll { adapter } => self.route_stop_poll(&adapter),
            Command::SetPowered { adapter, powered } => self.route_set_powered(&adapter, powered),
            Command::WriteRecord { tag, fields } => self.route_write(&tag, &fields),
            Command::PushRecord { device, fields } => self.route_push(&device, &fields),
        }
    }

    /// Start the discovery loop. An adapter already polling reports
    /// `PollingAlreadyActive`, whether the cache or the daemon noticed.
    pub fn start_poll(&mut self, adapter: impl AsRef<str>, mode: PollMode) -> Result<(), CoreError> {
        self.execute(Command::StartPoll {
            adapter: adapter.as_ref().into(),
            mode,
        })
    }

    pub fn stop_poll(&mut self, adapter: impl AsRef<str>) -> Result<(), CoreError> {
        self.execute(Command::StopPoll {
            adapter: adapter.as_ref().into(),
        })
    }

    pub fn set_powered(&mut self, adapter: impl AsRef<str>, powered: bool) -> Result<(), CoreError> {
        self.execute(Command::SetPowered {
            adapter: adapter.as_ref().into(),
            powered,
        })
    }

    /// Write a record to a tag.
    pub fn write_record(&mut self, tag: impl AsRef<str>, fields: RecordFields) -> Result<(), CoreError> {
        self.execute(Command::WriteRecord {
            tag: tag.as_ref().into(),
            fields,
        })
    }

    /// Push a record to a peer device.
    pub fn push_record(
        &mut self,
        device: impl AsRef<str>,
        fields: RecordFields,
    ) -> Result<(), CoreError> {
        self.execute(Command::PushRecord {
            device: device.as_ref().into(),
            fields,
        })
    }

    // ── Routing ──────────────────────────────────────────────────────

    fn route_start_poll(&mut self, adapter: &AdapterPath, mode: PollMode) -> Result<(), CoreError> {
        let cached = self.known_adapter(adapter)?;
        if cached.is_polling() {
            return Err(CoreError::PollingAlreadyActive {
                path: adapter.to_string(),
            });
        }

        let call = MethodCall::new(
            adapter.as_path().clone(),
            Interface::Adapter,
            method::START_POLL_LOOP,
        )
        .arg(mode.to_string());

        match self.directory.invoke(call) {
            Ok(()) => {
                self.mark_polling(adapter, true);
                info!(adapter = %adapter, %mode, "poll loop started");
                Ok(())
            }
            Err(e) if e.is_daemon_error(error_name::ALREADY_ENABLED) => {
                debug!(adapter = %adapter, "daemon reports poll loop already running");
                self.mark_polling(adapter, true);
                Err(CoreError::PollingAlreadyActive {
                    path: adapter.to_string(),
                })
            }
            Err(e) => Err(remote_failure(method::START_POLL_LOOP, e)),
        }
    }

    /// Forwarded as is: the daemon decides whether stopping an idle loop
    /// is an error.
    fn route_stop_poll(&mut self, adapter: &AdapterPath) -> Result<(), CoreError> {
        self.known_adapter(adapter)?;
        let call = MethodCall::new(
            adapter.as_path().clone(),
            Interface::Adapter,
            method::STOP_POLL_LOOP,
        );
        self.directory
            .invoke(call)
            .map_err(|e| remote_failure(method::STOP_POLL_LOOP, e))?;
        self.mark_polling(adapter, false);
        info!(adapter = %adapter, "poll loop stopped");
        Ok(())
    }

    fn route_set_powered(&mut self, adapter: &AdapterPath, powered: bool) -> Result<(), CoreError> {
        self.known_adapter(adapter)?;
        let call = MethodCall::new(adapter.as_path().clone(), Interface::Properties, method::SET)
            .arg(Interface::Adapter.as_str())
            .arg(adapter_key::POWERED)
            .arg(powered);
        self.directory
            .invoke(call)
            .map_err(|e| remote_failure(method::SET, e))?;

        if let Some(cached) = self.store.adapters.get_mut(adapter) {
            cached.powered = powered;
        }
        info!(adapter = %adapter, powered, "adapter power set");
        Ok(())
    }

    fn route_write(&mut self, tag: &TagPath, fields: &RecordFields) -> Result<(), CoreError> {
        if !self.store.tags.contains(tag) {
            return Err(CoreError::NoTag {
                path: tag.to_string(),
            });
        }
        fields.validate()?;
        let call = MethodCall::new(tag.as_path().clone(), Interface::Tag, method::WRITE)
            .arg(PropertyValue::Dict(fields.to_property_bag()))
            .timeout(self.config.write_timeout);
        self.directory
            .invoke(call)
            .map_err(|e| remote_failure(method::WRITE, e))?;
        info!(tag = %tag, "record written");
        Ok(())
    }

    fn route_push(&mut self, device: &DevicePath, fields: &RecordFields) -> Result<(), CoreError> {
        if !self.store.devices.contains(device) {
            return Err(CoreError::NoDevice {
                path: device.to_string(),
            });
        }
        fields.validate()?;
        let call = MethodCall::new(device.as_path().clone(), Interface::Device, method::PUSH)
            .arg(PropertyValue::Dict(fields.to_property_bag()))
            .timeout(self.config.write_timeout);
        self.directory
            .invoke(call)
            .map_err(|e| remote_failure(method::PUSH, e))?;
        info!(device = %device, "record pushed");
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn known_adapter(&self, adapter: &AdapterPath) -> Result<&crate::model::Adapter, CoreError> {
        self.store
            .adapters
            .get(adapter)
            .ok_or_else(|| CoreError::NoAdapter {
                path: adapter.to_string(),
            })
    }

    fn mark_polling(&mut self, adapter: &AdapterPath, polling: bool) {
        if let Some(cached) = self.store.adapters.get_mut(adapter) {
            cached.polling = polling;
        }
    }
}

fn remote_failure(method: &str, err: nearfield_api::Error) -> CoreError {
    warn!(method, error = %err, "daemon call failed");
    CoreError::from(err)
}
