/**
 * LatentReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

extern crate csv;
extern crate serde;
extern crate serde_json;

use std;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;

use interactions::RawInteraction;
use recommend::ScoredItem;
use stats::IdMapping;

/// Reads a CSV input file. We expect NO headers, and a user-item pair per
/// line with tab separation. A third column with an interaction weight is
/// optional and defaults to 1.0.
pub fn csv_reader(file: &str) -> Result<csv::Reader<File>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_path(file)?;

    Ok(reader)
}

pub fn csv_reader_from_reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(source)
}

pub fn interactions_from_csv<'a, R>(
    reader: &'a mut csv::Reader<R>
) -> impl Iterator<Item=RawInteraction> + 'a
    where R: std::io::Read {

    reader.records()
        .filter_map(|result| result.ok())
        .filter_map(|record| {
            let user = record.get(0)?.to_string();
            let item = record.get(1)?.to_string();
            let weight = match record.get(2) {
                Some(column) if !column.is_empty() => column.parse().ok()?,
                _ => 1.0,
            };

            Some((user, item, weight))
        })
}

/// Struct used for JSON serialization of computed recommendations. Field
/// names will be used in JSON.
#[derive(Serialize)]
struct Recommendations<'a> {
    for_user: &'a str,
    recommended_items: Vec<RecommendedItem<'a>>,
}

#[derive(Serialize)]
struct RecommendedItem<'a> {
    item: &'a str,
    score: f64,
}

/// Output the computed recommendations in JSON format, one user per line,
/// using the original identifiers from the input file. If a
/// `recommendations_path` is supplied, we write to a file at the specified
/// path, otherwise, we output to stdout.
pub fn write_recommendations(
    recommendations: &[(u32, Vec<ScoredItem>)],
    user_ids: &IdMapping,
    item_ids: &IdMapping,
    recommendations_path: Option<String>,
) -> Result<(), Box<dyn Error>> {

    let mut out: Box<dyn Write> = match recommendations_path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    for &(user, ref scored_items) in recommendations {

        let for_user = user_ids.to_external_id(user)?;

        let recommended_items = scored_items.iter()
            .map(|scored_item| {
                let item = item_ids.to_external_id(scored_item.item)?;
                Ok(RecommendedItem { item: item, score: scored_item.score })
            })
            .collect::<Result<Vec<_>, Box<dyn Error>>>()?;

        let recommendations_as_json = json!(
            Recommendations {
                for_user,
                recommended_items
            });

        write!(out, "{}\n", recommendations_as_json.to_string())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::{csv_reader_from_reader, interactions_from_csv};

    #[test]
    fn parses_pairs_and_triples() {
        let input = "alice\tapple\nbob\tdog\t2.5\nalice\tpony\n";

        let mut reader = csv_reader_from_reader(input.as_bytes());
        let records: Vec<_> = interactions_from_csv(&mut reader).collect();

        assert_eq!(records, vec![
            ("alice".to_string(), "apple".to_string(), 1.0),
            ("bob".to_string(), "dog".to_string(), 2.5),
            ("alice".to_string(), "pony".to_string(), 1.0),
        ]);
    }

    #[test]
    fn skips_unparseable_weights_and_short_lines() {
        let input = "alice\tapple\tnot-a-number\nlonely\nbob\tdog\t3\n";

        let mut reader = csv_reader_from_reader(input.as_bytes());
        let records: Vec<_> = interactions_from_csv(&mut reader).collect();

        assert_eq!(records, vec![
            ("bob".to_string(), "dog".to_string(), 3.0),
        ]);
    }
}
