use std::marker::PhantomData;

use serde_json::Value;

use super::{ArgParser, ParserBuilder};
use crate::config::ParserConfig;
use crate::error::ArgsError;
use crate::flatten::ArgumentSpec;
use crate::reconstruct::instantiate;
use crate::schema::{Record, RecordRef, SchemaError};

/// A tuple of record types parsed together, in declaration order.
pub trait RecordSet: Sized {
    fn records() -> Vec<RecordRef>;
    fn from_values(values: Vec<Value>) -> Result<Self, ArgsError>;
}

macro_rules! record_set {
    ($($name:ident),+) => {
        impl<$($name: Record),+> RecordSet for ($($name,)+) {
            fn records() -> Vec<RecordRef> {
                vec![$(RecordRef::of::<$name>()),+]
            }

            fn from_values(values: Vec<Value>) -> Result<Self, ArgsError> {
                let mut values = values.into_iter();
                Ok(($(
                    instantiate::<$name>(values.next().ok_or_else(|| {
                        ArgsError::InternalConsistency("fewer values than records".to_string())
                    })?)?,
                )+))
            }
        }
    };
}

record_set!(A);
record_set!(A, B);
record_set!(A, B, C);
record_set!(A, B, C, D);
record_set!(A, B, C, D, E);
record_set!(A, B, C, D, E, F);
record_set!(A, B, C, D, E, F, G);
record_set!(A, B, C, D, E, F, G, H);
record_set!(A, B, C, D, E, F, G, H, I);
record_set!(A, B, C, D, E, F, G, H, I, J);

/// Parses several records at once and returns them as a tuple.
#[derive(Debug, Clone)]
pub struct MultiParser<S> {
    inner: ArgParser,
    _records: PhantomData<fn() -> S>,
}

impl<S: RecordSet> MultiParser<S> {
    pub fn new() -> Result<Self, ArgsError> {
        Self::from_builder(ParserBuilder::default())
    }

    pub fn with_config(config: ParserConfig) -> Result<Self, ArgsError> {
        Self::from_builder(ParserBuilder::default().config(config))
    }

    /// Builds from a prepared builder. An empty builder gets every record of
    /// `S`; otherwise its records must be exactly those of `S`, in order.
    pub fn from_builder(builder: ParserBuilder) -> Result<Self, ArgsError> {
        let expected = S::records();
        let builder = if builder.is_empty() {
            expected
                .iter()
                .fold(builder, |builder, record| builder.add(*record, None))
        } else {
            let found: Vec<RecordRef> = builder.records().collect();
            if found != expected {
                return Err(SchemaError::RecordMismatch {
                    expected: names(&expected),
                    found: names(&found),
                }
                .into());
            }
            builder
        };

        Ok(Self {
            inner: builder.build()?,
            _records: PhantomData,
        })
    }

    pub fn parse_args<I, T>(&self, argv: I) -> Result<S, ArgsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        S::from_values(self.inner.parse_values(argv)?)
    }

    /// Returns the records and the tokens that were not recognized.
    pub fn parse_known_args<I, T>(&self, argv: I) -> Result<(S, Vec<String>), ArgsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let (values, unknown) = self.inner.parse_known_values(argv)?;
        Ok((S::from_values(values)?, unknown))
    }

    /// Parses the process arguments.
    pub fn parse_env(&self) -> Result<S, ArgsError> {
        self.parse_args(
            std::env::args_os()
                .skip(1)
                .map(|arg| arg.to_string_lossy().into_owned()),
        )
    }

    pub fn specs(&self) -> &[ArgumentSpec] {
        self.inner.specs()
    }

    pub fn untyped(&self) -> &ArgParser {
        &self.inner
    }
}

fn names(records: &[RecordRef]) -> String {
    records
        .iter()
        .map(|r| r.short_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parser for a single record.
#[derive(Debug, Clone)]
pub struct Parser<T> {
    inner: MultiParser<(T,)>,
}

impl<T: Record> Parser<T> {
    pub fn new() -> Result<Self, ArgsError> {
        Self::from_builder(ParserBuilder::default())
    }

    pub fn with_config(config: ParserConfig) -> Result<Self, ArgsError> {
        Self::from_builder(ParserBuilder::default().config(config))
    }

    pub fn from_builder(builder: ParserBuilder) -> Result<Self, ArgsError> {
        Ok(Self {
            inner: MultiParser::from_builder(builder)?,
        })
    }

    pub fn parse_args<I, S>(&self, argv: I) -> Result<T, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.parse_args(argv).map(|(record,)| record)
    }

    pub fn parse_known_args<I, S>(&self, argv: I) -> Result<(T, Vec<String>), ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ((record,), unknown) = self.inner.parse_known_args(argv)?;
        Ok((record, unknown))
    }

    pub fn parse_env(&self) -> Result<T, ArgsError> {
        self.inner.parse_env().map(|(record,)| record)
    }

    pub fn specs(&self) -> &[ArgumentSpec] {
        self.inner.specs()
    }

    pub fn untyped(&self) -> &ArgParser {
        self.inner.untyped()
    }
}
