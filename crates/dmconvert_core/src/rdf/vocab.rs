//! IRIs of the legacy export vocabulary.
//!
//! Values are the raw IRIs as written in the export. Node tables key on
//! normalized IRIs, see [`crate::model::node::normalize_uri`].

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const DC_CREATOR: &str = "http://purl.org/dc/elements/1.1/creator";
pub const DCTERMS_DESCRIPTION: &str = "http://purl.org/dc/terms/description";
pub const ORE_AGGREGATES: &str = "http://www.openarchives.org/ore/terms/aggregates";
pub const CNT_CHARS: &str = "http://www.w3.org/2011/content#chars";

pub const FOAF_AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";
pub const FOAF_MBOX: &str = "http://xmlns.com/foaf/0.1/mbox";

pub const DM_PROJECT: &str = "http://dm.drew.edu/ns/Project";
pub const DCMITYPE_TEXT: &str = "http://purl.org/dc/dcmitype/Text";
pub const DCMITYPE_IMAGE: &str = "http://purl.org/dc/dcmitype/Image";
pub const SC_CANVAS: &str = "http://www.shared-canvas.org/ns/Canvas";
pub const EXIF_WIDTH: &str = "http://www.w3.org/2003/12/exif/ns#width";
pub const EXIF_HEIGHT: &str = "http://www.w3.org/2003/12/exif/ns#height";

pub const OA_ANNOTATION: &str = "http://www.w3.org/ns/oa#Annotation";
pub const OA_HAS_BODY: &str = "http://www.w3.org/ns/oa#hasBody";
pub const OA_HAS_TARGET: &str = "http://www.w3.org/ns/oa#hasTarget";
pub const OA_SPECIFIC_RESOURCE: &str = "http://www.w3.org/ns/oa#SpecificResource";
pub const OA_HAS_SOURCE: &str = "http://www.w3.org/ns/oa#hasSource";
pub const OA_HAS_SELECTOR: &str = "http://www.w3.org/ns/oa#hasSelector";
pub const OA_SVG_SELECTOR: &str = "http://www.w3.org/ns/oa#SvgSelector";
pub const OA_TEXT_QUOTE_SELECTOR: &str = "http://www.w3.org/ns/oa#TextQuoteSelector";
pub const OA_EXACT: &str = "http://www.w3.org/ns/oa#exact";
