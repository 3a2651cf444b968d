use std::collections::{HashMap, HashSet};

use log::debug;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Params, Row};
use uuid::Uuid;

use crate::model::{
    CalibrationMethod, Edge, Experiment, ExperimentType, Instrument, Molecule, Peak, Polarization,
    Preparation, Sample, SpectrumPoint, Synonym, Vendor,
};

use super::{CandidateQuery, MoleculeCandidate, Repository, StoreError, Table};

/// Largest id list bound into a single `IN (...)` clause
const HYDRATE_CHUNK: usize = 500;

const MOLECULE_COLUMNS: &str = "id, iupac_name, chemical_formula, smiles, inchi, cas_number, \
     pubchem_cid, image_url, created_at";

const SAMPLE_COLUMNS: &str = "id, identifier, molecule_id, vendor_id, substrate, solvent, \
     thickness_nm, processing_method, created_at";

const EXPERIMENT_COLUMNS: &str = "id, sample_id, instrument_id, edge_id, polarization_id, \
     calibration_id, experiment_type, measured_at, created_by, created_at";

/// Exact registry / external id matches and case-insensitive prefix matches.
///
/// Both sides are folded with `unicode_lower`, never SQLite's ASCII-only
/// `lower()`. ?1 folded query text, ?2 registry flag, ?3 external id flag,
/// ?4 escaped prefix pattern over the folded query
const DIRECT_MATCH_SQL: &str = r#"
SELECT m.id FROM molecules m
WHERE (?2 AND m.cas_number IS NOT NULL AND unicode_lower(m.cas_number) = ?1)
   OR (?3 AND m.pubchem_cid IS NOT NULL AND unicode_lower(m.pubchem_cid) = ?1)
   OR unicode_lower(m.iupac_name) LIKE ?4 ESCAPE '\'
   OR unicode_lower(m.chemical_formula) LIKE ?4 ESCAPE '\'
   OR EXISTS (
        SELECT 1 FROM molecule_synonyms s
        WHERE s.molecule_id = m.id AND unicode_lower(s.synonym) LIKE ?4 ESCAPE '\'
   )
"#;

/// Name of the SQL function registered by [`register_functions`]
pub(crate) const FOLD_FUNCTION: &str = "unicode_lower";

/// Register the Unicode case-folding function used by candidate queries.
///
/// Folding matches `str::to_lowercase`, the same folding the ranking rules use.
pub(crate) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

const NAME_TEXT_SQL: &str =
    "SELECT molecule_id, rank FROM molecule_text WHERE molecule_text MATCH ?1";

const SYNONYM_TEXT_SQL: &str =
    "SELECT molecule_id, rank FROM synonym_text WHERE synonym_text MATCH ?1";

/// [`Repository`] backed by a SQLite connection or transaction
pub struct SqliteRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteRepository<'c> {
    /// Bind a repository to a connection (a `Transaction` derefs to one)
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn fetch_one<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Option<T>, StoreError>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let row = stmt.query_row(params, map).optional()?;
        Ok(row)
    }

    fn fetch_all<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>, StoreError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, map)?;
        let collected = rows.collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(collected)
    }

    /// Full-text hits keyed by molecule, keeping the best statistic per molecule
    fn text_hits(&self, sql: &str, expression: &str) -> Result<Vec<(Uuid, f64)>, StoreError> {
        let rows = self.fetch_all(sql, [expression], |row| {
            // FTS5 rank is BM25, negative and lower-is-better
            Ok((uuid_at(row, 0)?, -row.get::<_, f64>(1)?))
        })?;

        let mut best: Vec<(Uuid, f64)> = Vec::with_capacity(rows.len());
        let mut index: HashMap<Uuid, usize> = HashMap::new();
        for (id, score) in rows {
            match index.get(&id) {
                Some(&i) => {
                    if score > best[i].1 {
                        best[i].1 = score;
                    }
                }
                None => {
                    index.insert(id, best.len());
                    best.push((id, score));
                }
            }
        }
        Ok(best)
    }

    fn molecules_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Molecule>, StoreError> {
        let mut molecules = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(HYDRATE_CHUNK) {
            let sql = format!(
                "SELECT {MOLECULE_COLUMNS} FROM molecules WHERE id IN ({})",
                placeholders(chunk.len())
            );
            let rows = self.fetch_all(
                &sql,
                params_from_iter(chunk.iter().map(|id| id.to_string())),
                molecule_from_row,
            )?;
            molecules.extend(rows.into_iter().map(|m| (m.id, m)));
        }
        Ok(molecules)
    }

    fn synonyms_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Synonym>>, StoreError> {
        let mut synonyms: HashMap<Uuid, Vec<Synonym>> = HashMap::new();
        for chunk in ids.chunks(HYDRATE_CHUNK) {
            let sql = format!(
                "SELECT molecule_id, synonym, display_order FROM molecule_synonyms \
                 WHERE molecule_id IN ({}) ORDER BY display_order, synonym",
                placeholders(chunk.len())
            );
            let rows = self.fetch_all(
                &sql,
                params_from_iter(chunk.iter().map(|id| id.to_string())),
                |row| Ok((uuid_at(row, 0)?, Synonym::new(row.get::<_, String>(1)?, row.get(2)?))),
            )?;
            for (id, synonym) in rows {
                synonyms.entry(id).or_default().push(synonym);
            }
        }
        Ok(synonyms)
    }
}

impl Repository for SqliteRepository<'_> {
    fn insert_molecule(&self, molecule: &Molecule, synonyms: &[Synonym]) -> Result<(), StoreError> {
        let id = molecule.id.to_string();
        self.conn.execute(
            &format!("INSERT INTO molecules ({MOLECULE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                id,
                molecule.iupac_name,
                molecule.chemical_formula,
                molecule.smiles,
                molecule.inchi,
                molecule.cas_number,
                molecule.pubchem_cid,
                molecule.image_url,
                molecule.created_at,
            ],
        )?;
        self.conn.execute(
            "INSERT INTO molecule_text (molecule_id, iupac_name, chemical_formula) VALUES (?1, ?2, ?3)",
            params![id, molecule.iupac_name, molecule.chemical_formula],
        )?;

        let mut synonym_row = self.conn.prepare_cached(
            "INSERT INTO molecule_synonyms (molecule_id, synonym, display_order) VALUES (?1, ?2, ?3)",
        )?;
        let mut synonym_text = self
            .conn
            .prepare_cached("INSERT INTO synonym_text (molecule_id, synonym) VALUES (?1, ?2)")?;
        for synonym in synonyms {
            synonym_row.execute(params![id, synonym.synonym, synonym.order])?;
            synonym_text.execute(params![id, synonym.synonym])?;
        }
        Ok(())
    }

    fn molecule(&self, id: Uuid) -> Result<Option<Molecule>, StoreError> {
        self.fetch_one(
            &format!("SELECT {MOLECULE_COLUMNS} FROM molecules WHERE id = ?1"),
            [id.to_string()],
            molecule_from_row,
        )
    }

    fn molecule_by_name(&self, iupac_name: &str) -> Result<Option<Molecule>, StoreError> {
        self.fetch_one(
            &format!("SELECT {MOLECULE_COLUMNS} FROM molecules WHERE iupac_name = ?1"),
            [iupac_name],
            molecule_from_row,
        )
    }

    fn synonyms(&self, molecule_id: Uuid) -> Result<Vec<Synonym>, StoreError> {
        self.fetch_all(
            "SELECT synonym, display_order FROM molecule_synonyms WHERE molecule_id = ?1 \
             ORDER BY display_order, synonym",
            [molecule_id.to_string()],
            |row| Ok(Synonym::new(row.get::<_, String>(0)?, row.get(1)?)),
        )
    }

    fn molecule_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<MoleculeCandidate>, StoreError> {
        let folded = query.text.to_lowercase();
        let pattern = format!("{}%", escape_like(&folded));
        let direct = self.fetch_all(
            DIRECT_MATCH_SQL,
            params![folded, query.match_registry, query.match_external_id, pattern],
            |row| uuid_at(row, 0),
        )?;

        let (name_hits, synonym_hits) = match &query.full_text {
            Some(expression) => (
                self.text_hits(NAME_TEXT_SQL, expression)?,
                self.text_hits(SYNONYM_TEXT_SQL, expression)?,
            ),
            None => (Vec::new(), Vec::new()),
        };
        debug!(
            "candidates for {:?}: {} direct, {} name text, {} synonym text",
            query.text,
            direct.len(),
            name_hits.len(),
            synonym_hits.len()
        );

        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = direct
            .iter()
            .chain(name_hits.iter().map(|(id, _)| id))
            .chain(synonym_hits.iter().map(|(id, _)| id))
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let name_ranks: HashMap<Uuid, f64> = name_hits.into_iter().collect();
        let synonym_ranks: HashMap<Uuid, f64> = synonym_hits.into_iter().collect();
        let mut molecules = self.molecules_by_ids(&ids)?;
        let mut synonyms = self.synonyms_by_ids(&ids)?;

        Ok(ids
            .into_iter()
            .filter_map(|id| {
                molecules.remove(&id).map(|molecule| MoleculeCandidate {
                    molecule,
                    synonyms: synonyms.remove(&id).unwrap_or_default(),
                    name_text_rank: name_ranks.get(&id).copied(),
                    synonym_text_rank: synonym_ranks.get(&id).copied(),
                })
            })
            .collect())
    }

    fn vendor(&self, id: Uuid) -> Result<Option<Vendor>, StoreError> {
        self.fetch_one(
            "SELECT id, name, url FROM vendors WHERE id = ?1",
            [id.to_string()],
            vendor_from_row,
        )
    }

    fn vendor_by_name(&self, name: &str) -> Result<Option<Vendor>, StoreError> {
        self.fetch_one(
            "SELECT id, name, url FROM vendors WHERE name = ?1",
            [name],
            vendor_from_row,
        )
    }

    fn insert_vendor(&self, vendor: &Vendor) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO vendors (id, name, url) VALUES (?1, ?2, ?3)",
            params![vendor.id.to_string(), vendor.name, vendor.url],
        )?;
        Ok(())
    }

    fn sample(&self, id: Uuid) -> Result<Option<Sample>, StoreError> {
        self.fetch_one(
            &format!("SELECT {SAMPLE_COLUMNS} FROM samples WHERE id = ?1"),
            [id.to_string()],
            sample_from_row,
        )
    }

    fn sample_by_identifier(&self, identifier: &str) -> Result<Option<Sample>, StoreError> {
        self.fetch_one(
            &format!("SELECT {SAMPLE_COLUMNS} FROM samples WHERE identifier = ?1"),
            [identifier],
            sample_from_row,
        )
    }

    fn insert_sample(&self, sample: &Sample) -> Result<(), StoreError> {
        let prep = &sample.preparation;
        self.conn.execute(
            &format!("INSERT INTO samples ({SAMPLE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                sample.id.to_string(),
                sample.identifier,
                sample.molecule_id.to_string(),
                sample.vendor_id.map(|id| id.to_string()),
                prep.substrate,
                prep.solvent,
                prep.thickness_nm,
                prep.processing_method,
                sample.created_at,
            ],
        )?;
        Ok(())
    }

    fn instrument(&self, id: Uuid) -> Result<Option<Instrument>, StoreError> {
        self.fetch_one(
            "SELECT id, name, facility FROM instruments WHERE id = ?1",
            [id.to_string()],
            instrument_from_row,
        )
    }

    fn instrument_by_name(&self, name: &str) -> Result<Option<Instrument>, StoreError> {
        self.fetch_one(
            "SELECT id, name, facility FROM instruments WHERE name = ?1",
            [name],
            instrument_from_row,
        )
    }

    fn insert_instrument(&self, instrument: &Instrument) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO instruments (id, name, facility) VALUES (?1, ?2, ?3)",
            params![instrument.id.to_string(), instrument.name, instrument.facility],
        )?;
        Ok(())
    }

    fn edge(&self, id: Uuid) -> Result<Option<Edge>, StoreError> {
        self.fetch_one(
            "SELECT id, target_atom, core_state FROM edges WHERE id = ?1",
            [id.to_string()],
            edge_from_row,
        )
    }

    fn edge_by_key(&self, target_atom: &str, core_state: &str) -> Result<Option<Edge>, StoreError> {
        self.fetch_one(
            "SELECT id, target_atom, core_state FROM edges WHERE target_atom = ?1 AND core_state = ?2",
            [target_atom, core_state],
            edge_from_row,
        )
    }

    fn insert_edge(&self, edge: &Edge) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO edges (id, target_atom, core_state) VALUES (?1, ?2, ?3)",
            params![edge.id.to_string(), edge.target_atom, edge.core_state],
        )?;
        Ok(())
    }

    fn calibration_method(&self, id: Uuid) -> Result<Option<CalibrationMethod>, StoreError> {
        self.fetch_one(
            "SELECT id, name, description FROM calibration_methods WHERE id = ?1",
            [id.to_string()],
            calibration_from_row,
        )
    }

    fn calibration_method_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CalibrationMethod>, StoreError> {
        self.fetch_one(
            "SELECT id, name, description FROM calibration_methods WHERE name = ?1",
            [name],
            calibration_from_row,
        )
    }

    fn insert_calibration_method(&self, method: &CalibrationMethod) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO calibration_methods (id, name, description) VALUES (?1, ?2, ?3)",
            params![method.id.to_string(), method.name, method.description],
        )?;
        Ok(())
    }

    fn polarization(&self, id: Uuid) -> Result<Option<Polarization>, StoreError> {
        self.fetch_one(
            "SELECT id, polar_angle, azimuthal_angle FROM polarizations WHERE id = ?1",
            [id.to_string()],
            polarization_from_row,
        )
    }

    fn polarization_by_angles(
        &self,
        polar_angle: f64,
        azimuthal_angle: f64,
    ) -> Result<Option<Polarization>, StoreError> {
        self.fetch_one(
            "SELECT id, polar_angle, azimuthal_angle FROM polarizations \
             WHERE polar_angle = ?1 AND azimuthal_angle = ?2",
            params![polar_angle, azimuthal_angle],
            polarization_from_row,
        )
    }

    fn insert_polarization(&self, polarization: &Polarization) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO polarizations (id, polar_angle, azimuthal_angle) VALUES (?1, ?2, ?3)",
            params![
                polarization.id.to_string(),
                polarization.polar_angle,
                polarization.azimuthal_angle
            ],
        )?;
        Ok(())
    }

    fn insert_experiment(&self, experiment: &Experiment) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO experiments ({EXPERIMENT_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                experiment.id.to_string(),
                experiment.sample_id.to_string(),
                experiment.instrument_id.to_string(),
                experiment.edge_id.to_string(),
                experiment.polarization_id.to_string(),
                experiment.calibration_id.map(|id| id.to_string()),
                experiment.experiment_type.as_str(),
                experiment.measured_at,
                experiment.created_by,
                experiment.created_at,
            ],
        )?;
        Ok(())
    }

    fn experiment(&self, id: Uuid) -> Result<Option<Experiment>, StoreError> {
        self.fetch_one(
            &format!("SELECT {EXPERIMENT_COLUMNS} FROM experiments WHERE id = ?1"),
            [id.to_string()],
            experiment_from_row,
        )
    }

    fn experiments_for_sample(&self, sample_id: Uuid) -> Result<Vec<Experiment>, StoreError> {
        self.fetch_all(
            &format!(
                "SELECT {EXPERIMENT_COLUMNS} FROM experiments WHERE sample_id = ?1 \
                 ORDER BY created_at, rowid"
            ),
            [sample_id.to_string()],
            experiment_from_row,
        )
    }

    fn insert_spectrum_points(
        &self,
        experiment_id: Uuid,
        points: &[SpectrumPoint],
    ) -> Result<usize, StoreError> {
        let id = experiment_id.to_string();
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO spectrum_points (experiment_id, energy, raw_abs) VALUES (?1, ?2, ?3)",
        )?;
        for point in points {
            stmt.execute(params![id, point.energy, point.raw_abs])?;
        }
        Ok(points.len())
    }

    fn spectrum_points(&self, experiment_id: Uuid) -> Result<Vec<SpectrumPoint>, StoreError> {
        self.fetch_all(
            "SELECT energy, raw_abs FROM spectrum_points WHERE experiment_id = ?1 \
             ORDER BY energy, rowid",
            [experiment_id.to_string()],
            |row| Ok(SpectrumPoint::new(row.get(0)?, row.get(1)?)),
        )
    }

    fn insert_peaks(&self, experiment_id: Uuid, peaks: &[Peak]) -> Result<usize, StoreError> {
        let id = experiment_id.to_string();
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO peaks (experiment_id, energy, intensity, label) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for peak in peaks {
            stmt.execute(params![id, peak.energy, peak.intensity, peak.label])?;
        }
        Ok(peaks.len())
    }

    fn peaks(&self, experiment_id: Uuid) -> Result<Vec<Peak>, StoreError> {
        self.fetch_all(
            "SELECT energy, intensity, label FROM peaks WHERE experiment_id = ?1 \
             ORDER BY energy, rowid",
            [experiment_id.to_string()],
            |row| {
                Ok(Peak {
                    energy: row.get(0)?,
                    intensity: row.get(1)?,
                    label: row.get(2)?,
                })
            },
        )
    }

    fn delete_experiment(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM experiments WHERE id = ?1", [id.to_string()])?;
        Ok(deleted > 0)
    }

    fn count(&self, table: Table) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Escape LIKE wildcards so user text matches literally (escape char `\`)
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn conversion_error(
    idx: usize,
    error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, error.into())
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text).map_err(|e| conversion_error(idx, e))
}

fn optional_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| Uuid::parse_str(&t).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn molecule_from_row(row: &Row<'_>) -> rusqlite::Result<Molecule> {
    Ok(Molecule {
        id: uuid_at(row, 0)?,
        iupac_name: row.get(1)?,
        chemical_formula: row.get(2)?,
        smiles: row.get(3)?,
        inchi: row.get(4)?,
        cas_number: row.get(5)?,
        pubchem_cid: row.get(6)?,
        image_url: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn vendor_from_row(row: &Row<'_>) -> rusqlite::Result<Vendor> {
    Ok(Vendor {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        url: row.get(2)?,
    })
}

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<Sample> {
    Ok(Sample {
        id: uuid_at(row, 0)?,
        identifier: row.get(1)?,
        molecule_id: uuid_at(row, 2)?,
        vendor_id: optional_uuid_at(row, 3)?,
        preparation: Preparation {
            substrate: row.get(4)?,
            solvent: row.get(5)?,
            thickness_nm: row.get(6)?,
            processing_method: row.get(7)?,
        },
        created_at: row.get(8)?,
    })
}

fn instrument_from_row(row: &Row<'_>) -> rusqlite::Result<Instrument> {
    Ok(Instrument {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        facility: row.get(2)?,
    })
}

fn edge_from_row(row: &Row<'_>) -> rusqlite::Result<Edge> {
    Ok(Edge {
        id: uuid_at(row, 0)?,
        target_atom: row.get(1)?,
        core_state: row.get(2)?,
    })
}

fn calibration_from_row(row: &Row<'_>) -> rusqlite::Result<CalibrationMethod> {
    Ok(CalibrationMethod {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn polarization_from_row(row: &Row<'_>) -> rusqlite::Result<Polarization> {
    Ok(Polarization {
        id: uuid_at(row, 0)?,
        polar_angle: row.get(1)?,
        azimuthal_angle: row.get(2)?,
    })
}

fn experiment_from_row(row: &Row<'_>) -> rusqlite::Result<Experiment> {
    let experiment_type: String = row.get(6)?;
    Ok(Experiment {
        id: uuid_at(row, 0)?,
        sample_id: uuid_at(row, 1)?,
        instrument_id: uuid_at(row, 2)?,
        edge_id: uuid_at(row, 3)?,
        polarization_id: uuid_at(row, 4)?,
        calibration_id: optional_uuid_at(row, 5)?,
        experiment_type: experiment_type
            .parse::<ExperimentType>()
            .map_err(|e| conversion_error(6, e))?,
        measured_at: row.get(7)?,
        created_by: row.get(8)?,
        created_at: row.get(9)?,
    })
}
