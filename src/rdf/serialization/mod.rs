//! RDF serialization
//!
//! Graphs are persisted as indented ("pretty") RDF/XML.

mod rdfxml;

pub use rdfxml::{RdfXmlParserWrapper, RdfXmlSerializerWrapper};

use oxigraph::model::Triple;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RDF/XML syntax error
    #[error("RDF/XML error: {0}")]
    Xml(#[from] rio_xml::RdfXmlError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// RDF/XML document reader
pub struct RdfParser;

impl RdfParser {
    /// Parse RDF/XML from a string
    pub fn parse(input: &str) -> ParseResult<Vec<Triple>> {
        RdfXmlParserWrapper::parse(input.as_bytes())
    }

    /// Parse an RDF/XML file
    pub fn parse_file(path: &Path) -> ParseResult<Vec<Triple>> {
        let file = File::open(path)?;
        RdfXmlParserWrapper::parse(BufReader::new(file))
    }
}

/// RDF/XML document writer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize triples to a string
    pub fn serialize(triples: &[Triple]) -> SerializeResult<String> {
        let output = RdfXmlSerializerWrapper::serialize(triples, Vec::new())?;
        String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
    }

    /// Serialize triples to a file, replacing any previous content
    pub fn serialize_file(triples: &[Triple], path: &Path) -> SerializeResult<()> {
        let file = File::create(path)?;
        let mut writer = RdfXmlSerializerWrapper::serialize(triples, BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }
}
