//! Declarative dataset schemas
//!
//! Each dataset is described as a table: the report entity, the entities
//! related to it, the ordered identity fields of every entity, and the
//! literal attributes it carries. The resolver and builder are generic over
//! these tables, so a new entity kind is a table edit.

use oxigraph::model::vocab::xsd;
use oxigraph::model::NamedNodeRef;
use std::fmt;

/// Scalar datatype of an attribute literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Integer,
    String,
    Date,
    Time,
    Double,
}

impl ScalarKind {
    /// XSD datatype IRI
    pub fn datatype(self) -> NamedNodeRef<'static> {
        match self {
            ScalarKind::Integer => xsd::INTEGER,
            ScalarKind::String => xsd::STRING,
            ScalarKind::Date => xsd::DATE,
            ScalarKind::Time => xsd::TIME,
            ScalarKind::Double => xsd::DOUBLE,
        }
    }
}

/// Kind of deduplicated entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Report,
    Person,
    Location,
    Charge,
    Crime,
    Booking,
    Premise,
    Weapon,
    Status,
}

impl EntityKind {
    /// Label used in entity URIs (`namespace + label + "#" + digest`)
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Report => "Report",
            EntityKind::Person => "Person",
            EntityKind::Location => "Location",
            EntityKind::Charge => "Charge",
            EntityKind::Crime => "Crime",
            EntityKind::Booking => "Booking",
            EntityKind::Premise => "Premise",
            EntityKind::Weapon => "Weapon",
            EntityKind::Status => "Status",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Literal-valued attribute of an entity
#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    /// Local name of the predicate
    pub predicate: &'static str,
    /// Source column
    pub field: &'static str,
    pub kind: ScalarKind,
}

const fn attr(predicate: &'static str, field: &'static str, kind: ScalarKind) -> Attribute {
    Attribute {
        predicate,
        field,
        kind,
    }
}

/// One entity kind as it appears in one dataset
#[derive(Debug, Clone, Copy)]
pub struct EntitySpec {
    pub kind: EntityKind,
    /// Local name of the `rdf:type` class
    pub class: &'static str,
    /// Identity fields, concatenated in this order before digesting
    pub identity: &'static [&'static str],
    pub attributes: &'static [Attribute],
    /// Local name of the report → entity predicate (`None` for the report itself)
    pub relation: Option<&'static str>,
}

/// A whole dataset: its report entity and the entities hanging off it
#[derive(Debug, Clone, Copy)]
pub struct DatasetSchema {
    /// Dataset name, also the id of the context it is imported into
    pub name: &'static str,
    pub report: EntitySpec,
    pub related: &'static [EntitySpec],
}

impl DatasetSchema {
    /// Report first, then related entities in declaration order
    pub fn entities(&self) -> impl Iterator<Item = &EntitySpec> {
        std::iter::once(&self.report).chain(self.related.iter())
    }

    /// Look up the spec of one entity kind
    pub fn entity(&self, kind: EntityKind) -> Option<&EntitySpec> {
        self.entities().find(|spec| spec.kind == kind)
    }

    /// Every column the schema reads, deduplicated, in first-use order
    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for spec in self.entities() {
            let used = spec
                .identity
                .iter()
                .copied()
                .chain(spec.attributes.iter().map(|a| a.field));
            for field in used {
                if !fields.contains(&field) {
                    fields.push(field);
                }
            }
        }
        fields
    }
}

use ScalarKind::{Date, Double, Integer, String as Str, Time};

/// LA arrest reports (`amvf-fr72`)
pub static ARREST_REPORTS: DatasetSchema = DatasetSchema {
    name: "arrest_reports",
    report: EntitySpec {
        kind: EntityKind::Report,
        class: "ArrestReports",
        identity: &["rpt_id"],
        attributes: &[
            attr("hasID", "rpt_id", Integer),
            attr("hasDate", "arst_date", Date),
            attr("hasTime", "time", Time),
            attr("hasReportType", "report_type", Str),
            attr("hasArrestType", "arst_typ_cd", Str),
            attr("hasDispositionDescription", "dispo_desc", Str),
        ],
        relation: None,
    },
    related: &[
        EntitySpec {
            kind: EntityKind::Person,
            class: "Person",
            identity: &["age", "sex_cd", "descent_cd"],
            attributes: &[
                attr("hasAge", "age", Integer),
                attr("hasSex", "sex_cd", Str),
                attr("hasDescent", "descent_cd", Str),
            ],
            relation: Some("hasPerson"),
        },
        EntitySpec {
            kind: EntityKind::Location,
            class: "Location",
            identity: &["rd", "area", "area_desc", "location", "crsst", "lat", "lon"],
            attributes: &[
                attr("hasReportingDistrictNumber", "rd", Integer),
                attr("hasAreaID", "area", Integer),
                attr("hasAreaName", "area_desc", Str),
                attr("hasAddress", "location", Str),
                attr("hasCrossStreet", "crsst", Str),
                attr("hasLatitude", "lat", Double),
                attr("hasLongitude", "lon", Double),
            ],
            relation: Some("hasLocation"),
        },
        EntitySpec {
            kind: EntityKind::Charge,
            class: "Charge",
            identity: &["chrg_grp_cd", "grp_description", "charge", "chrg_desc"],
            attributes: &[
                attr("hasChargeGroupCode", "chrg_grp_cd", Integer),
                attr("hasChargeGroupDescription", "grp_description", Str),
                attr("hasChargeCode", "charge", Integer),
                attr("hasChargeDescription", "chrg_desc", Str),
            ],
            relation: Some("hasCharge"),
        },
        EntitySpec {
            kind: EntityKind::Booking,
            class: "Booking",
            identity: &["bkg_date", "bkg_time", "bgk_location", "bkg_loc_cd"],
            attributes: &[
                attr("hasBookingDate", "bkg_date", Date),
                attr("hasBookingTime", "bkg_time", Time),
                attr("hasBookingLocation", "bgk_location", Str),
                attr("hasBookingCode", "bkg_loc_cd", Integer),
            ],
            relation: Some("hasBooking"),
        },
    ],
};

/// LA crime reports (`2nrs-mtv8`)
pub static CRIME_REPORTS: DatasetSchema = DatasetSchema {
    name: "crime_reports",
    report: EntitySpec {
        kind: EntityKind::Report,
        class: "CrimeReport",
        identity: &["dr_no"],
        attributes: &[
            attr("hasID", "dr_no", Integer),
            attr("hasTime", "time_occ", Time),
            attr("hasDate", "date_occ", Date),
            attr("hasDateReported", "date_rptd", Date),
            attr("hasMocodes", "mocodes", Str),
            attr("hasPart1-2", "part_1_2", Integer),
        ],
        relation: None,
    },
    related: &[
        EntitySpec {
            kind: EntityKind::Person,
            class: "Person",
            identity: &["vict_age", "vict_sex", "vict_descent"],
            attributes: &[
                attr("hasAge", "vict_age", Integer),
                attr("hasSex", "vict_sex", Str),
                attr("hasDescent", "vict_descent", Str),
            ],
            relation: Some("hasPerson"),
        },
        EntitySpec {
            kind: EntityKind::Location,
            class: "Location",
            identity: &["rpt_dist_no", "area", "area_name", "location", "cross_street", "lat", "lon"],
            attributes: &[
                attr("hasReportingDistrictNumber", "rpt_dist_no", Integer),
                attr("hasAreaID", "area", Integer),
                attr("hasAreaName", "area_name", Str),
                attr("hasAddress", "location", Str),
                attr("hasCrossStreet", "cross_street", Str),
                attr("hasLatitude", "lat", Double),
                attr("hasLongitude", "lon", Double),
            ],
            relation: Some("hasLocation"),
        },
        EntitySpec {
            kind: EntityKind::Crime,
            class: "Crime",
            identity: &["crm_cd", "crm_cd_desc", "crm_cd_1", "crm_cd_2", "crm_cd_3", "crm_cd_4"],
            attributes: &[
                attr("hasCrimeCommitted", "crm_cd", Integer),
                attr("hasCrimeCommittedDescription", "crm_cd_desc", Str),
                attr("hasCrimeCommitted1", "crm_cd_1", Integer),
                attr("hasCrimeCommitted2", "crm_cd_2", Integer),
                attr("hasCrimeCommitted3", "crm_cd_3", Integer),
                attr("hasCrimeCommitted4", "crm_cd_4", Integer),
            ],
            relation: Some("hasCrime"),
        },
        EntitySpec {
            kind: EntityKind::Premise,
            class: "Premise",
            identity: &["premis_cd", "premis_desc"],
            attributes: &[
                attr("hasPremiseCode", "premis_cd", Integer),
                attr("hasPremiseDescription", "premis_desc", Str),
            ],
            relation: Some("hasPremise"),
        },
        EntitySpec {
            kind: EntityKind::Weapon,
            class: "Weapon",
            identity: &["weapon_used_cd", "weapon_desc"],
            attributes: &[
                attr("hasWeaponCode", "weapon_used_cd", Integer),
                attr("hasWeaponDescription", "weapon_desc", Str),
            ],
            relation: Some("hasWeapon"),
        },
        EntitySpec {
            kind: EntityKind::Status,
            class: "Status",
            identity: &["status", "status_desc"],
            attributes: &[
                attr("hasStatusCode", "status", Integer),
                attr("hasStatusDescription", "status_desc", Str),
            ],
            relation: Some("hasStatus"),
        },
    ],
};

/// Every built-in dataset, in import order
pub static DATASETS: [&DatasetSchema; 2] = [&ARREST_REPORTS, &CRIME_REPORTS];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_is_first_entity() {
        for schema in DATASETS {
            let kinds: Vec<_> = schema.entities().map(|e| e.kind).collect();
            assert_eq!(kinds[0], EntityKind::Report);
            assert!(schema.report.relation.is_none());
            assert!(schema.related.iter().all(|e| e.relation.is_some()));
        }
    }

    #[test]
    fn test_dataset_specific_kinds() {
        assert!(ARREST_REPORTS.entity(EntityKind::Booking).is_some());
        assert!(ARREST_REPORTS.entity(EntityKind::Weapon).is_none());
        assert!(CRIME_REPORTS.entity(EntityKind::Premise).is_some());
        assert!(CRIME_REPORTS.entity(EntityKind::Charge).is_none());
    }

    #[test]
    fn test_identity_fields_are_attributes() {
        // Every identity field is also emitted as a literal of the same entity
        for schema in DATASETS {
            for spec in schema.entities() {
                for field in spec.identity {
                    assert!(
                        spec.attributes.iter().any(|a| a.field == *field),
                        "{}.{} has no attribute",
                        spec.kind,
                        field
                    );
                }
            }
        }
    }

    #[test]
    fn test_required_fields_are_unique() {
        let fields = CRIME_REPORTS.required_fields();
        let mut deduped = fields.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(fields.len(), deduped.len());
        assert_eq!(fields[0], "dr_no");
    }

    #[test]
    fn test_scalar_datatypes() {
        assert_eq!(ScalarKind::Integer.datatype().as_str(), "http://www.w3.org/2001/XMLSchema#integer");
        assert_eq!(ScalarKind::Double.datatype().as_str(), "http://www.w3.org/2001/XMLSchema#double");
    }
}
