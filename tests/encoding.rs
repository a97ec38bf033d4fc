use std::error::Error;

use csv_stream_rs::{
    error::CsvError,
    item::csv::{csv_reader::CsvReaderBuilder, mapping::MappedRecord},
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn utf8_rows_are_left_untouched() -> Result<(), Box<dyn Error>> {
    let reader = CsvReaderBuilder::new()
        .to_encoding("UTF-8")
        .key_by_column_name()
        .fake(&["name;label", "féé;1", "plain;2"], None)?;

    let records = reader.to_vec()?;

    assert_eq!(records[0].get("name"), Some("féé"));
    assert_eq!(records[1].get("name"), Some("plain"));

    Ok(())
}

#[test]
fn latin1_rows_are_converted() -> Result<(), Box<dyn Error>> {
    let data: &[u8] = b"Pr\xe9nom;Nom d'usage\ncl\xe9mentine;Dupont\n";

    let reader = CsvReaderBuilder::new()
        .to_encoding("UTF-8")
        .key_by_column_name()
        .from_reader(data)?;

    let records = reader.to_vec()?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].keys(), Some(vec!["prenom", "nom_d_usage"]));
    assert_eq!(records[0].get("prenom"), Some("clémentine"));
    assert_eq!(records[0].get("nom_d_usage"), Some("Dupont"));

    Ok(())
}

#[test]
fn each_row_is_detected_on_its_own() -> Result<(), Box<dyn Error>> {
    let mut data = "name;city\nZoé;Montréal\n".as_bytes().to_vec();
    data.extend_from_slice(b"Ana\xefs;Orl\xe9ans\n");
    data.extend_from_slice("Jérôme;Besançon\n".as_bytes());

    let reader = CsvReaderBuilder::new()
        .to_encoding("UTF-8")
        .from_reader(data.as_slice())?;

    let rows = reader.to_collection(|record: MappedRecord| record.into_values())?;

    assert_eq!(
        rows,
        vec![
            vec!["Zoé", "Montréal"],
            vec!["Anaïs", "Orléans"],
            vec!["Jérôme", "Besançon"],
        ]
    );

    Ok(())
}

#[test]
fn search_order_decides_between_legacy_encodings() -> Result<(), Box<dyn Error>> {
    let data: &[u8] = b"price\n12 \xa4\n";

    let euro = CsvReaderBuilder::new()
        .search_encodings(&["ISO-8859-15", "UTF-8"])
        .to_encoding("UTF-8")
        .from_reader(data)?;
    assert_eq!(euro.to_vec()?[0].values(), vec!["12 €"]);

    let currency = CsvReaderBuilder::new()
        .search_encodings(&["ISO-8859-1", "ISO-8859-15", "UTF-8"])
        .to_encoding("UTF-8")
        .from_reader(data)?;
    assert_eq!(currency.to_vec()?[0].values(), vec!["12 ¤"]);

    Ok(())
}

#[test]
fn legacy_target_still_yields_text() -> Result<(), Box<dyn Error>> {
    let mut data = b"name\nZo\xe9\n".to_vec();
    data.extend_from_slice("Zoé\n".as_bytes());

    let reader = CsvReaderBuilder::new()
        .to_encoding("ISO-8859-1")
        .from_reader(data.as_slice())?;

    let names = reader.to_collection(|record: MappedRecord| record.into_values().remove(0))?;

    assert_eq!(names, vec!["Zoé", "Zoé"]);
    assert_eq!(reader.to_encoding(), Some("windows-1252"));

    Ok(())
}

#[test]
fn undetectable_rows_are_decoded_lossily() -> Result<(), Box<dyn Error>> {
    init_logger();

    let data: &[u8] = b"name;count\na\x81b;1\n";

    let reader = CsvReaderBuilder::new()
        .to_encoding("UTF-8")
        .from_reader(data)?;

    let records = reader.to_vec()?;

    assert_eq!(records[0].values(), vec!["a\u{FFFD}b", "1"]);

    Ok(())
}

#[test]
fn target_outside_search_encodings_fails_before_reading() {
    let result = CsvReaderBuilder::new()
        .search_encodings(&["ISO-8859-1"])
        .to_encoding("UTF-8")
        .from_path("/does/not/exist.csv");

    match result {
        Err(CsvError::InvalidEncodingConfiguration { target, candidates }) => {
            assert_eq!(target, "UTF-8");
            assert_eq!(candidates, "windows-1252");
        }
        Err(other) => panic!("expected an invalid configuration, got {}", other),
        Ok(_) => panic!("expected an invalid configuration"),
    }

    let fake = CsvReaderBuilder::new()
        .search_encodings(&["ISO-8859-15"])
        .to_encoding("ISO-8859-1")
        .fake(&["a;b"], None);
    assert!(matches!(
        fake,
        Err(CsvError::InvalidEncodingConfiguration { .. })
    ));
}

#[test]
fn unknown_encoding_labels_are_rejected() {
    let result = CsvReaderBuilder::new()
        .search_encodings(&["UTF-8", "klingon"])
        .from_reader("a;b".as_bytes());

    assert!(matches!(result, Err(CsvError::UnknownEncoding(label)) if label == "klingon"));
}

#[test]
fn default_search_encodings_are_exposed() -> Result<(), Box<dyn Error>> {
    let reader = CsvReaderBuilder::new().from_reader("a;b".as_bytes())?;

    assert_eq!(
        reader.search_encodings(),
        vec!["windows-1252", "ISO-8859-15", "UTF-8"]
    );
    assert_eq!(reader.to_encoding(), None);

    Ok(())
}

#[test]
fn keyed_reader_never_falls_back_to_positions() {
    let data: &[u8] = b"Pr\xe9nom;Nom\nfoo;bar\nonly_one\n";

    let reader = CsvReaderBuilder::new()
        .key_by_column_name()
        .from_reader(data)
        .unwrap();

    let pulls = reader.rows().collect::<Vec<_>>();

    assert_eq!(pulls.len(), 3);
    assert!(matches!(pulls[0], Err(CsvError::Utf8 { line: 1 })));
    assert!(
        pulls[1..]
            .iter()
            .all(|pull| matches!(pull, Err(CsvError::MissingHeadings { .. })))
    );
}
