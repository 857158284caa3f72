use async_trait::async_trait;
use chrono::{DateTime, Utc};
use extract::Triple;
use ontology::rdf::{RDF_TYPE, XSD_NS, ntriples_line};
use ontology::{Statement, Term, display_name, escape_literal};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::store::{GraphInfo, GraphStore, StoreHealth, StoreReport};

/// Graph holding one description per recorded graph.
pub const METADATA_GRAPH: &str = "http://graph/metadata";
const VOCAB: &str = "http://graph/vocab#";

/// Triple store reached over the SPARQL 1.1 protocol.
#[derive(Clone)]
pub struct SparqlStore {
    query_endpoint: String,
    update_endpoint: String,
    batch_size: usize,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SelectResponse {
    results: Bindings,
}

#[derive(Deserialize)]
struct Bindings {
    bindings: Vec<HashMap<String, BoundValue>>,
}

#[derive(Deserialize)]
struct BoundValue {
    value: String,
}

type Row = HashMap<String, BoundValue>;

fn vocab(local: &str) -> String {
    format!("{VOCAB}{local}")
}

/// `INSERT DATA` request body for one batch.
pub fn insert_data(graph_iri: &str, statements: &[Statement]) -> String {
    let mut body = format!("INSERT DATA {{\n  GRAPH <{graph_iri}> {{\n");
    for statement in statements {
        body.push_str("    ");
        body.push_str(&ntriples_line(statement));
        body.push('\n');
    }
    body.push_str("  }\n}");
    body
}

pub fn search_query(graph_iri: &str, term: &str, limit: usize) -> String {
    let needle = escape_literal(&term.to_lowercase());
    format!(
        r#"SELECT ?s ?p ?o
WHERE {{
  GRAPH <{graph_iri}> {{
    ?s ?p ?o .
    FILTER (
      CONTAINS(LCASE(STR(?s)), "{needle}") ||
      CONTAINS(LCASE(STR(?p)), "{needle}") ||
      CONTAINS(LCASE(STR(?o)), "{needle}")
    )
  }}
}}
LIMIT {limit}"#
    )
}

fn graph_query(graph_iri: &str, limit: usize) -> String {
    format!("SELECT ?s ?p ?o WHERE {{ GRAPH <{graph_iri}> {{ ?s ?p ?o . }} }} LIMIT {limit}")
}

fn list_query() -> String {
    format!(
        r#"SELECT ?g ?name ?extraction ?created ?count ?pages ?length ?score
WHERE {{
  GRAPH <{METADATA_GRAPH}> {{
    ?g a <{graph}> ;
       <{name}> ?name ;
       <{extraction}> ?extraction ;
       <{created}> ?created ;
       <{count}> ?count ;
       <{pages}> ?pages ;
       <{length}> ?length ;
       <{score}> ?score .
  }}
}}
ORDER BY DESC(?created)"#,
        graph = vocab("Graph"),
        name = vocab("name"),
        extraction = vocab("extractionId"),
        created = vocab("created"),
        count = vocab("triplesCount"),
        pages = vocab("documentPages"),
        length = vocab("documentLength"),
        score = vocab("validationScore"),
    )
}

/// Metadata description of a recorded graph.
pub fn metadata_statements(info: &GraphInfo) -> Vec<Statement> {
    let subject = Term::iri(info.graph_iri.clone());
    let integer = |n: usize| Term::typed(n.to_string(), format!("{XSD_NS}integer"));
    vec![
        Statement::new(subject.clone(), RDF_TYPE, Term::iri(vocab("Graph"))),
        Statement::new(subject.clone(), vocab("name"), Term::literal(info.graph_name.clone())),
        Statement::new(subject.clone(), vocab("extractionId"), Term::literal(info.extraction_id.clone())),
        Statement::new(
            subject.clone(),
            vocab("created"),
            Term::typed(info.created.to_rfc3339(), format!("{XSD_NS}dateTime")),
        ),
        Statement::new(subject.clone(), vocab("triplesCount"), integer(info.triples_count)),
        Statement::new(subject.clone(), vocab("documentPages"), integer(info.document_pages)),
        Statement::new(subject.clone(), vocab("documentLength"), integer(info.document_length)),
        Statement::new(
            subject,
            vocab("validationScore"),
            Term::typed(info.validation_score.to_string(), format!("{XSD_NS}decimal")),
        ),
    ]
}

fn text<'a>(row: &'a Row, var: &str) -> Result<&'a str> {
    row.get(var)
        .map(|v| v.value.as_str())
        .ok_or_else(|| StoreError::Malformed(format!("missing binding ?{var}")))
}

fn parsed<T: std::str::FromStr>(row: &Row, var: &str) -> Result<T> {
    text(row, var)?
        .parse()
        .map_err(|_| StoreError::Malformed(format!("unparseable binding ?{var}")))
}

fn graph_info(row: &Row) -> Result<GraphInfo> {
    let created: DateTime<Utc> = DateTime::parse_from_rfc3339(text(row, "created")?)
        .map_err(|e| StoreError::Malformed(format!("?created: {e}")))?
        .with_timezone(&Utc);
    Ok(GraphInfo {
        graph_iri: text(row, "g")?.to_string(),
        graph_name: text(row, "name")?.to_string(),
        extraction_id: text(row, "extraction")?.to_string(),
        created,
        triples_count: parsed(row, "count")?,
        document_pages: parsed(row, "pages")?,
        document_length: parsed(row, "length")?,
        validation_score: parsed(row, "score")?,
    })
}

/// `?s ?p ?o` rows as display triples.
fn spo_triples(rows: &[Row]) -> Vec<Triple> {
    rows.iter()
        .filter_map(|row| {
            let s = display_name(text(row, "s").ok()?);
            let p = display_name(text(row, "p").ok()?);
            let o = text(row, "o").ok()?;
            let o = if o.contains("://") { display_name(o) } else { o.to_string() };
            Triple::new(&s, &p, &o)
        })
        .collect()
}

impl SparqlStore {
    pub fn new(
        query_endpoint: String,
        update_endpoint: String,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Self> {
        if query_endpoint.is_empty() || update_endpoint.is_empty() {
            return Err(StoreError::Config(
                "both query and update endpoints are required".to_string(),
            ));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            query_endpoint,
            update_endpoint,
            batch_size: batch_size.max(1),
            client,
        })
    }

    async fn update(&self, body: String) -> Result<()> {
        let response = self
            .client
            .post(&self.update_endpoint)
            .header(CONTENT_TYPE, "application/sparql-update")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Endpoint { status, body });
        }
        Ok(())
    }

    async fn select(&self, query: String) -> Result<Vec<Row>> {
        let response = self
            .client
            .post(&self.query_endpoint)
            .header(CONTENT_TYPE, "application/sparql-query")
            .header(ACCEPT, "application/sparql-results+json")
            .body(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Endpoint { status, body });
        }

        let parsed: SelectResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(parsed.results.bindings)
    }
}

#[async_trait]
impl GraphStore for SparqlStore {
    async fn insert(&self, graph_iri: &str, statements: &[Statement]) -> Result<StoreReport> {
        let mut report = StoreReport::new(graph_iri, statements.len());

        for (i, batch) in statements.chunks(self.batch_size).enumerate() {
            match self.update(insert_data(graph_iri, batch)).await {
                Ok(()) => {
                    report.stored += batch.len();
                    debug!(batch = i, statements = batch.len(), "Stored batch");
                }
                Err(e) => {
                    report.failed += batch.len();
                    warn!(batch = i, statements = batch.len(), error = %e, "Batch insert failed");
                }
            }
        }

        info!(
            graph = graph_iri,
            stored = report.stored,
            failed = report.failed,
            "Inserted statements"
        );
        Ok(report)
    }

    async fn record_graph(&self, info: GraphInfo) -> Result<()> {
        self.update(insert_data(METADATA_GRAPH, &metadata_statements(&info)))
            .await
    }

    async fn list_graphs(&self) -> Result<Vec<GraphInfo>> {
        let rows = self.select(list_query()).await?;
        rows.iter().map(graph_info).collect()
    }

    async fn search(&self, graph_iri: &str, term: &str, limit: usize) -> Result<Vec<Triple>> {
        let rows = self.select(search_query(graph_iri, term, limit)).await?;
        Ok(spo_triples(&rows))
    }

    async fn triples(&self, graph_iri: &str, limit: usize) -> Result<Vec<Triple>> {
        let rows = self.select(graph_query(graph_iri, limit)).await?;
        if rows.is_empty() {
            return Err(StoreError::GraphNotFound(graph_iri.to_string()));
        }
        Ok(spo_triples(&rows))
    }

    async fn health(&self) -> StoreHealth {
        let result = self
            .client
            .post(&self.query_endpoint)
            .header(CONTENT_TYPE, "application/sparql-query")
            .header(ACCEPT, "application/sparql-results+json")
            .body("ASK { ?s ?p ?o }")
            .send()
            .await;

        let (reachable, detail) = match result {
            Ok(response) if response.status().is_success() => (true, None),
            Ok(response) => (false, Some(format!("endpoint returned {}", response.status()))),
            Err(e) => (false, Some(e.to_string())),
        };
        StoreHealth {
            backend: "sparql",
            reachable,
            detail,
        }
    }
}
