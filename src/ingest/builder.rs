//! Graph construction
//!
//! Turns normalized dataset records into triples inside one named context.
//! A record whose entities cannot all be resolved is rejected whole; other
//! records proceed. There is no rollback: if the store fails mid-batch, the
//! context keeps the triples inserted so far.

use super::resolver::{EntityResolver, ResolveError};
use super::schema::{DatasetSchema, EntitySpec};
use super::table::{Record, Table};
use crate::rdf::{ContextStore, StoreError};
use oxigraph::model::vocab::rdf;
use oxigraph::model::{Literal, NamedNode, Triple};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// The namespace cannot be used for entity URIs
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolveError),

    /// Store failure; the context may hold a partial batch
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Outcome of one import batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Records read from the table
    pub records: usize,
    /// Records rejected because an identity field was missing
    pub rejected: usize,
    /// Triples that were not already in the context
    pub inserted: usize,
}

/// Writes dataset records into a context store
pub struct GraphBuilder<'a> {
    store: &'a mut ContextStore,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(store: &'a mut ContextStore) -> Self {
        Self { store }
    }

    /// Insert every record of `table` into `context`
    pub fn build(
        &mut self,
        table: &Table,
        schema: &DatasetSchema,
        namespace: &str,
        context: &str,
    ) -> BuildResult<BuildReport> {
        let resolver = EntityResolver::new(namespace)?;
        let mut report = BuildReport::default();

        info!("Adding {} to graph...", schema.name.replace('_', " "));

        for record in table.records() {
            report.records += 1;
            match record_triples(&resolver, schema, &record) {
                Ok(triples) => {
                    report.inserted += self.store.extend(context, &triples)?;
                }
                Err(e) => {
                    debug!("Rejecting record {} of {}: {}", record.index(), schema.name, e);
                    report.rejected += 1;
                }
            }
        }

        if report.rejected > 0 {
            warn!(
                "{} of {} {} records rejected",
                report.rejected, report.records, schema.name
            );
        }
        info!(
            "Context '{}': {} new triples from {} records",
            context, report.inserted, report.records
        );

        Ok(report)
    }
}

fn predicate(namespace: &str, local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{}{}", namespace, local))
}

fn entity_triples(
    resolver: &EntityResolver,
    spec: &EntitySpec,
    subject: &NamedNode,
    record: &Record<'_>,
    triples: &mut Vec<Triple>,
) -> Result<(), ResolveError> {
    let namespace = resolver.namespace();

    triples.push(Triple::new(
        subject.clone(),
        rdf::TYPE,
        predicate(namespace, spec.class),
    ));

    for attribute in spec.attributes {
        let value = record.get(attribute.field).ok_or_else(|| ResolveError::MissingField {
            kind: spec.kind,
            field: attribute.field.to_string(),
        })?;
        triples.push(Triple::new(
            subject.clone(),
            predicate(namespace, attribute.predicate),
            Literal::new_typed_literal(value, attribute.kind.datatype()),
        ));
    }

    Ok(())
}

/// All triples one record contributes, or the first resolution failure
pub fn record_triples(
    resolver: &EntityResolver,
    schema: &DatasetSchema,
    record: &Record<'_>,
) -> Result<Vec<Triple>, ResolveError> {
    let namespace = resolver.namespace();
    let mut triples = Vec::new();

    let report = resolver.resolve(&schema.report, record)?;
    entity_triples(resolver, &schema.report, &report, record, &mut triples)?;

    for spec in schema.related {
        let entity = resolver.resolve(spec, record)?;
        entity_triples(resolver, spec, &entity, record, &mut triples)?;

        if let Some(relation) = spec.relation {
            triples.push(Triple::new(
                report.clone(),
                predicate(namespace, relation),
                entity,
            ));
        }
    }

    Ok(triples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::schema::{EntityKind, ARREST_REPORTS};
    use oxigraph::model::Subject;

    const NS: &str = "https://data.lacity.org/";

    const ARREST_HEADER: &[&str] = &[
        "rpt_id", "arst_date", "time", "report_type", "arst_typ_cd", "dispo_desc",
        "age", "sex_cd", "descent_cd",
        "rd", "area", "area_desc", "location", "crsst", "lat", "lon",
        "chrg_grp_cd", "grp_description", "charge", "chrg_desc",
        "bkg_date", "bkg_time", "bgk_location", "bkg_loc_cd",
    ];

    fn arrest_row(rpt_id: &str, age: &str) -> Vec<String> {
        [
            rpt_id, "2019-12-24T00:00:00.000", "1530", "BOOKING", "M", "MISDEMEANOR COMPLAINT FILED",
            age, "M", "H",
            "1822", "18", "SOUTHEAST", "10300 S MAIN ST", "", "33.9429", "-118.2739",
            "24", "MISCELLANEOUS OTHER VIOLATIONS", "41.27(C)LAMC", "DRINKING IN PUBLIC",
            "2019-12-24T00:00:00.000", "1700", "77TH STREET", "4212",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn arrest_table(rows: Vec<Vec<String>>) -> Table {
        Table::from_rows(ARREST_HEADER.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_record_triples_shape() {
        let resolver = EntityResolver::new(NS).unwrap();
        let table = arrest_table(vec![arrest_row("5568617", "30")]);
        let triples = record_triples(&resolver, &ARREST_REPORTS, &table.record(0).unwrap()).unwrap();

        let type_count = triples.iter().filter(|t| t.predicate.as_ref() == rdf::TYPE).count();
        let attribute_count: usize = ARREST_REPORTS.entities().map(|e| e.attributes.len()).sum();
        let relation_count = ARREST_REPORTS.related.len();

        assert_eq!(type_count, 5);
        assert_eq!(triples.len(), type_count + attribute_count + relation_count);

        let report = resolver.resolve_values(EntityKind::Report, ["5568617"]);
        assert!(triples.iter().any(|t| t.subject == Subject::NamedNode(report.clone())
            && t.predicate.as_str() == "https://data.lacity.org/hasPerson"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut store = ContextStore::new("https://data.lacity.org/context/").unwrap();
        let table = arrest_table(vec![arrest_row("1", "30"), arrest_row("2", "41")]);

        let first = GraphBuilder::new(&mut store)
            .build(&table, &ARREST_REPORTS, NS, "arrest_reports")
            .unwrap();
        let count = store.context_len("arrest_reports").unwrap();

        let second = GraphBuilder::new(&mut store)
            .build(&table, &ARREST_REPORTS, NS, "arrest_reports")
            .unwrap();

        assert_eq!(first.records, 2);
        assert_eq!(first.inserted, count);
        assert_eq!(second.inserted, 0);
        assert_eq!(store.context_len("arrest_reports").unwrap(), count);
    }

    #[test]
    fn test_shared_entities_are_deduplicated() {
        let mut store = ContextStore::new("https://data.lacity.org/context/").unwrap();
        // Same location, charge and booking; different reports and persons
        let table = arrest_table(vec![arrest_row("1", "30"), arrest_row("2", "41")]);

        let report = GraphBuilder::new(&mut store)
            .build(&table, &ARREST_REPORTS, NS, "arrest_reports")
            .unwrap();

        let per_record = record_triples(
            &EntityResolver::new(NS).unwrap(),
            &ARREST_REPORTS,
            &table.record(0).unwrap(),
        )
        .unwrap()
        .len();
        assert!(report.inserted < per_record * 2);
    }

    #[test]
    fn test_missing_column_rejects_records() {
        let mut store = ContextStore::new("https://data.lacity.org/context/").unwrap();
        let table = Table::from_rows(
            vec!["rpt_id".to_string()],
            vec![vec!["1".to_string()]],
        )
        .unwrap();

        let report = GraphBuilder::new(&mut store)
            .build(&table, &ARREST_REPORTS, NS, "arrest_reports")
            .unwrap();

        assert_eq!(report, BuildReport { records: 1, rejected: 1, inserted: 0 });
        assert!(store.is_empty().unwrap());
    }
}
