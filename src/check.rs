//! One check cycle: scan, then query and encode each device in turn.

use crate::collectors::attributes::parse_attributes;
use crate::collectors::info::parse_info;
use crate::collectors::scan::parse_scan;
use crate::collectors::smartctl::{Smartctl, SmartctlOutput};
use crate::config::{Config, DevicesConfig};
use crate::error::SmartctlError;
use crate::metrics::{self, EncodeOptions, MetricFieldSet};
use crate::models::device::DeviceDescriptor;
use crate::models::smart::{DeviceInfo, HealthState, SmartAttribute};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Where the three raw reports come from.
pub trait ReportSource {
    fn scan(&self) -> Result<SmartctlOutput, SmartctlError>;
    fn info(&self, dev: &DeviceDescriptor) -> Result<SmartctlOutput, SmartctlError>;
    fn attributes(&self, dev: &DeviceDescriptor) -> Result<SmartctlOutput, SmartctlError>;
}

impl ReportSource for Smartctl {
    fn scan(&self) -> Result<SmartctlOutput, SmartctlError> {
        Smartctl::scan(self)
    }

    fn info(&self, dev: &DeviceDescriptor) -> Result<SmartctlOutput, SmartctlError> {
        Smartctl::info(self, dev)
    }

    fn attributes(&self, dev: &DeviceDescriptor) -> Result<SmartctlOutput, SmartctlError> {
        Smartctl::attributes(self, dev)
    }
}

/// Everything gathered for one device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub device:     DeviceDescriptor,
    pub info:       DeviceInfo,
    /// Attributes that passed the allow-list.
    pub attributes: Vec<SmartAttribute>,
    pub fields:     MetricFieldSet,
}

pub struct Checker<S> {
    source:  S,
    allowed: HashSet<u32>,
    opts:    EncodeOptions,
    devices: DevicesConfig,
}

impl<S: ReportSource> Checker<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            allowed: config.attributes.allowed(),
            opts:    EncodeOptions {
                use_names: config.attributes.use_names,
                detailed:  config.attributes.detailed,
            },
            devices: config.devices.clone(),
        }
    }

    /// List devices. Any failure here aborts the cycle.
    pub fn scan(&self) -> Result<Vec<DeviceDescriptor>> {
        let out = self.source.scan().context("scanning devices")?;
        let stdout = out.check().context("scanning devices")?;
        let devices: Vec<DeviceDescriptor> = parse_scan(stdout)
            .into_iter()
            .filter(|d| {
                let skip = self.devices.is_excluded(&d.path);
                if skip {
                    debug!(disk = %d.path, "excluded by config");
                }
                !skip
            })
            .collect();
        info!(count = devices.len(), patterns = self.devices.exclude.len(), "scan complete");
        Ok(devices)
    }

    /// Query and encode one device. Never fails: a device that can't be fully
    /// read still gets a report with whatever was parsed.
    pub fn check_device(&self, dev: &DeviceDescriptor) -> DeviceReport {
        debug!(disk = %dev.path, raw = dev.raw.trim(), "checking device");
        let info = parse_info(&tolerant_stdout(self.source.info(dev), dev));
        match info.health_state() {
            HealthState::Passed      => {}
            HealthState::Unsupported => debug!(disk = %dev.path, "no SMART self-assessment"),
            HealthState::Failed(s)   => warn!(disk = %dev.path, health = %s, "self-assessment not passed"),
        }

        let attributes: Vec<SmartAttribute> = if info.smart_support {
            parse_attributes(&tolerant_stdout(self.source.attributes(dev), dev))
                .into_iter()
                .filter(|a| self.allowed.contains(&a.id))
                .collect()
        } else {
            Vec::new()
        };

        let fields = metrics::encode(&info, &attributes, &self.allowed, self.opts);
        DeviceReport { device: dev.clone(), info, attributes, fields }
    }

    /// Scan and check every device sequentially.
    pub fn run(&self) -> Result<Vec<DeviceReport>> {
        Ok(self.scan()?.iter().map(|d| self.check_device(d)).collect())
    }
}

/// Stdout of a per-device call, logging rather than failing on errors.
fn tolerant_stdout(res: Result<SmartctlOutput, SmartctlError>, dev: &DeviceDescriptor) -> String {
    match res {
        Ok(out) => {
            if let Err(e) = out.check() {
                warn!(disk = %dev.path, error = %e, stderr = out.stderr.trim(), "smartctl reported problems");
            }
            out.stdout
        }
        Err(e) => {
            warn!(disk = %dev.path, error = %e, "smartctl failed");
            String::new()
        }
    }
}
