//! RDF/XML format implementation

use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use oxigraph::model::vocab::xsd;
use oxigraph::model::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_xml::{RdfXmlFormatter, RdfXmlParser};
use std::io::{BufRead, Write};

/// Indentation width of exported documents
const INDENTATION: usize = 4;

/// RDF/XML parser
pub struct RdfXmlParserWrapper;

impl RdfXmlParserWrapper {
    /// Parse an RDF/XML document to Triples
    pub fn parse(reader: impl BufRead) -> ParseResult<Vec<Triple>> {
        let mut parser = RdfXmlParser::new(reader, None);
        let mut triples = Vec::new();

        parser.parse_all(&mut |t| -> Result<(), ParseError> {
            let subject = convert_subject(t.subject)?;
            let predicate = convert_named_node(t.predicate)?;
            let object = convert_object(t.object)?;

            triples.push(Triple::new(subject, predicate, object));
            Ok(())
        })?;

        Ok(triples)
    }
}

/// RDF/XML serializer
pub struct RdfXmlSerializerWrapper;

impl RdfXmlSerializerWrapper {
    /// Serialize Triples as indented RDF/XML into `writer`
    pub fn serialize<W: Write>(triples: &[Triple], writer: W) -> SerializeResult<W> {
        let mut formatter = RdfXmlFormatter::with_indentation(writer, INDENTATION)?;

        for triple in triples {
            let subject = match &triple.subject {
                Subject::NamedNode(n) => {
                    rio_api::model::Subject::NamedNode(rio_api::model::NamedNode { iri: n.as_str() })
                }
                Subject::BlankNode(b) => {
                    rio_api::model::Subject::BlankNode(rio_api::model::BlankNode { id: b.as_str() })
                }
                #[allow(unreachable_patterns)]
                _ => {
                    return Err(SerializeError::Serialize(
                        "Quoted triples are not supported in RDF/XML".to_string(),
                    ))
                }
            };

            let predicate = rio_api::model::NamedNode { iri: triple.predicate.as_str() };

            let object = match &triple.object {
                Term::NamedNode(n) => {
                    rio_api::model::Term::NamedNode(rio_api::model::NamedNode { iri: n.as_str() })
                }
                Term::BlankNode(b) => {
                    rio_api::model::Term::BlankNode(rio_api::model::BlankNode { id: b.as_str() })
                }
                Term::Literal(l) => rio_api::model::Term::Literal(literal_to_rio(l)),
                #[allow(unreachable_patterns)]
                _ => {
                    return Err(SerializeError::Serialize(
                        "Quoted triples are not supported in RDF/XML".to_string(),
                    ))
                }
            };

            formatter.format(&rio_api::model::Triple {
                subject,
                predicate,
                object,
            })?;
        }

        Ok(formatter.finish()?)
    }
}

fn literal_to_rio(l: &Literal) -> rio_api::model::Literal<'_> {
    if let Some(language) = l.language() {
        rio_api::model::Literal::LanguageTaggedString {
            value: l.value(),
            language,
        }
    } else if l.datatype() == xsd::STRING {
        rio_api::model::Literal::Simple { value: l.value() }
    } else {
        rio_api::model::Literal::Typed {
            value: l.value(),
            datatype: rio_api::model::NamedNode { iri: l.datatype().as_str() },
        }
    }
}

fn convert_named_node(n: rio_api::model::NamedNode) -> Result<NamedNode, ParseError> {
    NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))
}

fn convert_blank_node(b: rio_api::model::BlankNode) -> Result<BlankNode, ParseError> {
    BlankNode::new(b.id).map_err(|e| ParseError::Parse(e.to_string()))
}

fn convert_subject(s: rio_api::model::Subject) -> Result<Subject, ParseError> {
    match s {
        rio_api::model::Subject::NamedNode(n) => Ok(convert_named_node(n)?.into()),
        rio_api::model::Subject::BlankNode(b) => Ok(convert_blank_node(b)?.into()),
        _ => Err(ParseError::Parse("Unsupported subject type".to_string())),
    }
}

fn convert_object(o: rio_api::model::Term) -> Result<Term, ParseError> {
    match o {
        rio_api::model::Term::NamedNode(n) => Ok(convert_named_node(n)?.into()),
        rio_api::model::Term::BlankNode(b) => Ok(convert_blank_node(b)?.into()),
        rio_api::model::Term::Literal(l) => {
            let literal = match l {
                rio_api::model::Literal::Simple { value } => Literal::new_simple_literal(value),
                rio_api::model::Literal::LanguageTaggedString { value, language } => {
                    Literal::new_language_tagged_literal(value, language)
                        .map_err(|e| ParseError::Parse(e.to_string()))?
                }
                rio_api::model::Literal::Typed { value, datatype } => {
                    Literal::new_typed_literal(value, convert_named_node(datatype)?)
                }
            };
            Ok(literal.into())
        }
        _ => Err(ParseError::Parse("Unsupported object type".to_string())),
    }
}
