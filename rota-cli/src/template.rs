//! Template command: print a permissive roster file to edit.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rota_core::RosterConfig;
use serde::{Deserialize, Serialize};

use crate::{
    ARG_TEMPLATE_DAYS, ARG_TEMPLATE_DUTIES, ARG_TEMPLATE_SERVICES, ARG_TEMPLATE_STAFF, CliError,
};

const DEFAULT_SERVICES: usize = 3;
const DEFAULT_DUTIES: usize = 1;
const DEFAULT_STAFF: usize = 10;
const DEFAULT_DAYS: usize = 28;

/// CLI arguments for the `template` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print a roster file in which everyone may work every \
                 service on every day. Every table is written out in full so \
                 its shape is visible before editing.",
    about = "Print a permissive roster file"
)]
#[ortho_config(prefix = "ROTA")]
pub(crate) struct TemplateArgs {
    /// Number of services.
    #[arg(long = ARG_TEMPLATE_SERVICES, value_name = "n")]
    #[serde(default)]
    pub(crate) services: Option<usize>,
    /// Number of standby duties.
    #[arg(long = ARG_TEMPLATE_DUTIES, value_name = "n")]
    #[serde(default)]
    pub(crate) duties: Option<usize>,
    /// Number of staff members.
    #[arg(long = ARG_TEMPLATE_STAFF, value_name = "n")]
    #[serde(default)]
    pub(crate) staff: Option<usize>,
    /// Number of days in the horizon.
    #[arg(long = ARG_TEMPLATE_DAYS, value_name = "n")]
    #[serde(default)]
    pub(crate) days: Option<usize>,
}

/// A roster configuration with every table spelled out.
pub(crate) fn template_config(
    services: usize,
    duties: usize,
    staff: usize,
    days: usize,
) -> RosterConfig {
    RosterConfig {
        service_names: (1..=services).map(|index| format!("service {index}")).collect(),
        duty_names: (1..=duties).map(|index| format!("duty {index}")).collect(),
        staff_names: (1..=staff).map(|index| format!("staff {index}")).collect(),
        day_count: days,
        accepts_rotation: vec![true; staff],
        hard_unavailable: vec![vec![false; days]; staff],
        soft_unavailable: vec![vec![false; days]; staff],
        can_work_with: vec![vec![true; staff]; staff],
        capability: vec![vec![vec![true; days]; staff]; services],
        ..RosterConfig::default()
    }
}

pub(crate) fn run_template_with(
    args: TemplateArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = template_config(
        merged.services.unwrap_or(DEFAULT_SERVICES),
        merged.duties.unwrap_or(DEFAULT_DUTIES),
        merged.staff.unwrap_or(DEFAULT_STAFF),
        merged.days.unwrap_or(DEFAULT_DAYS),
    );
    config.validate().map_err(CliError::InvalidTemplate)?;
    let payload = serde_json::to_string_pretty(&config).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}
