//! Ties flattened specs to clap and routes its output through coercion and
//! reconstruction.

pub mod args;
mod typed;

use std::path::Path;

use clap::Command;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::{ArgMatches, ValueSource as ClapSource};
use serde_json::Value;

use crate::coerce::{RawValue, coerce_all};
use crate::config::{self, ParserConfig, errors::ConfigError};
use crate::error::ArgsError;
use crate::flatten::{ArgumentSpec, Flattener, check_unique};
use crate::reconstruct::reconstruct;
use crate::resolve::{CustomParsers, ResolvedRecord, Resolver, TypeRegistry};
use crate::schema::{DeclaredType, FieldPath, Record, RecordRef, SchemaError, ValueParser};

pub use typed::{MultiParser, Parser, RecordSet};

/// Upper bound on records per parser.
pub const MAX_RECORDS: usize = 10;

/// Flags clap defines itself.
const RESERVED_FLAGS: &[&str] = &["--help"];

/// A root record and where its fields live.
#[derive(Debug, Clone)]
struct RootRecord {
    record: RecordRef,
    prefix: FieldPath,
    resolved: ResolvedRecord,
}

/// Untyped parser: yields one JSON value per record.
#[derive(Debug, Clone)]
pub struct ArgParser {
    command: Command,
    roots: Vec<RootRecord>,
    specs: Vec<ArgumentSpec>,
}

impl ArgParser {
    pub fn builder() -> ParserBuilder {
        ParserBuilder::default()
    }

    /// Flags in registration order.
    pub fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Records in declaration order.
    pub fn records(&self) -> Vec<RecordRef> {
        self.roots.iter().map(|root| root.record).collect()
    }

    pub fn render_help(&self) -> String {
        self.command.clone().render_help().to_string()
    }

    /// Parses `argv` (without the program name). Unknown flags are errors.
    pub fn parse_values<I, S>(&self, argv: I) -> Result<Vec<Value>, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = argv.into_iter().map(Into::into).collect();
        let matches = self.tokenize(&tokens)?;
        self.assemble(&matches)
    }

    /// Like [`parse_values`](Self::parse_values), but tokens clap does not
    /// recognize are set aside and returned in their original order.
    pub fn parse_known_values<I, S>(&self, argv: I) -> Result<(Vec<Value>, Vec<String>), ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = argv.into_iter().map(Into::into).collect();
        let mut unknown = Vec::new();

        loop {
            match self.tokenize(&tokens) {
                Ok(matches) => {
                    let values = self.assemble(&matches)?;
                    return Ok((values, unknown));
                }
                Err(err) if err.kind() == ErrorKind::UnknownArgument => {
                    let Some(index) = unknown_position(&err, &tokens) else {
                        return Err(err.into());
                    };
                    let token = tokens.remove(index);
                    tracing::debug!(token = %token, "set aside unrecognized token");
                    unknown.push(token);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn tokenize(&self, tokens: &[String]) -> Result<ArgMatches, clap::Error> {
        let program = self.command.get_name().to_string();
        self.command
            .clone()
            .try_get_matches_from(std::iter::once(program).chain(tokens.iter().cloned()))
    }

    fn assemble(&self, matches: &ArgMatches) -> Result<Vec<Value>, ArgsError> {
        let mut lookup_error = None;
        let parsed = coerce_all(&self.specs, |spec| match raw_value(matches, spec) {
            Ok(raw) => raw,
            Err(e) => {
                lookup_error.get_or_insert(e);
                None
            }
        })?;
        if let Some(e) = lookup_error {
            return Err(e);
        }

        self.roots
            .iter()
            .map(|root| reconstruct(&root.resolved, &parsed, &root.prefix))
            .collect()
    }
}

/// Position of the token clap rejected, matching `--flag` and `--flag=value`.
fn unknown_position(err: &clap::Error, tokens: &[String]) -> Option<usize> {
    let Some(ContextValue::String(rejected)) = err.get(ContextKind::InvalidArg) else {
        return None;
    };
    tokens.iter().position(|token| {
        token == rejected || token.split_once('=').is_some_and(|(flag, _)| flag == rejected.as_str())
    })
}

fn raw_value(matches: &ArgMatches, spec: &ArgumentSpec) -> Result<Option<RawValue>, ArgsError> {
    let id = spec.long_name();
    if matches.value_source(id) != Some(ClapSource::CommandLine) {
        return Ok(None);
    }

    let values: Vec<String> = matches
        .try_get_many::<String>(id)
        .map_err(|e| ArgsError::InternalConsistency(format!("reading {}: {e}", spec.flag_name)))?
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    tracing::trace!(flag = %spec.flag_name, values = ?values, "raw values");

    if spec.is_multiple() {
        return Ok(Some(RawValue::Many(values)));
    }
    // Repeated single-valued flags keep the last occurrence.
    Ok(values.into_iter().last().map(RawValue::Single))
}

/// Collects records and settings for an [`ArgParser`].
#[derive(Debug, Clone, Default)]
pub struct ParserBuilder {
    config: ParserConfig,
    records: Vec<(RecordRef, Option<String>)>,
    extra: Vec<RecordRef>,
    defaults: Option<Value>,
    parsers: CustomParsers,
}

impl ParserBuilder {
    pub fn config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a root record whose flags are named from its own fields.
    pub fn record<T: Record>(self) -> Self {
        self.add(RecordRef::of::<T>(), None)
    }

    /// Adds a root record whose fields live under `namespace`, so `port`
    /// becomes `--server-port` for namespace `server`.
    pub fn record_in<T: Record>(self, namespace: impl Into<String>) -> Self {
        self.add(RecordRef::of::<T>(), Some(namespace.into()))
    }

    pub fn add(mut self, record: RecordRef, namespace: Option<String>) -> Self {
        self.records.push((record, namespace));
        self
    }

    /// Makes a record available to forward references without parsing it.
    pub fn register<T: Record>(mut self) -> Self {
        self.extra.push(RecordRef::of::<T>());
        self
    }

    /// Default values laid out like the record tree. They override the
    /// defaults in the record definitions.
    pub fn defaults(mut self, document: Value) -> Self {
        self.defaults = Some(document);
        self
    }

    /// Reads every field or element declared as `declared` with `parse`.
    /// Takes precedence over field parsers.
    pub fn type_parser(mut self, declared: DeclaredType, parse: fn(&str) -> Result<Value, String>) -> Self {
        self.parsers.insert_type(declared, ValueParser::new(parse));
        self
    }

    /// Reads the field at `path` with `parse`. The path is dotted and includes
    /// the record's namespace, if any. Collections call `parse` per element.
    pub fn field_parser(mut self, path: &str, parse: fn(&str) -> Result<Value, String>) -> Self {
        self.parsers.insert_field(FieldPath::from(path), ValueParser::new(parse));
        self
    }

    pub fn defaults_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let document = config::load_document(path.as_ref())?;
        Ok(self.defaults(document))
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = RecordRef> + '_ {
        self.records.iter().map(|(record, _)| *record)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn build(self) -> Result<ArgParser, ArgsError> {
        if self.records.is_empty() || self.records.len() > MAX_RECORDS {
            return Err(SchemaError::RecordCount {
                count: self.records.len(),
                max: MAX_RECORDS,
            }
            .into());
        }

        let mut registry = TypeRegistry::new();
        for record in self.extra.iter().copied().chain(self.records()) {
            registry.collect(record);
        }
        tracing::debug!(records = registry.len(), "collected record definitions");
        let resolver = Resolver::new(&registry).with_parsers(&self.parsers);
        let flattener = Flattener::new(self.config.naming());

        let mut roots = Vec::with_capacity(self.records.len());
        let mut specs = Vec::new();
        for (record, namespace) in &self.records {
            let prefix = namespace
                .as_deref()
                .map(FieldPath::from)
                .unwrap_or_default();
            let resolved = resolver.resolve_root_at(*record, &prefix)?;
            let seed = match &self.defaults {
                Some(document) => config::defaults_at(document, &prefix)?,
                None => None,
            };
            specs.extend(flattener.flatten_at(&resolved, &prefix, seed)?);
            roots.push(RootRecord {
                record: *record,
                prefix,
                resolved,
            });
        }

        check_unique(&specs)?;
        if let Some(spec) = specs
            .iter()
            .find(|spec| RESERVED_FLAGS.contains(&spec.flag_name.as_str()))
        {
            return Err(SchemaError::ReservedFlag {
                flag: spec.flag_name.clone(),
                path: spec.dotted_path.clone(),
            }
            .into());
        }

        let mut command = Command::new(self.config.program_name.clone()).args_override_self(true);
        if let Some(about) = &self.config.about {
            command = command.about(about.clone());
        }
        for spec in &specs {
            tracing::debug!(flag = %spec.flag_name, path = %spec.dotted_path, "registering flag");
            command = command.arg(args::to_clap_arg(spec));
        }

        Ok(ArgParser {
            command,
            roots,
            specs,
        })
    }
}
