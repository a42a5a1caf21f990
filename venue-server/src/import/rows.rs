//! CSV row parsing
//!
//! Pure row-to-model conversion. Song files use English headers; product
//! files arrive from the legacy inventory tool with Spanish headers, mapped
//! here and nowhere else. Parsers return a message per bad row so the
//! import can report precisely and keep going.

use crate::db::models::{Product, STATUS_AVAILABLE, Song};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Case-insensitive header-name to column-index map
pub fn header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

fn field<'r>(
    record: &'r StringRecord,
    headers: &HashMap<String, usize>,
    name: &str,
) -> Option<&'r str> {
    headers
        .get(name)
        .and_then(|&i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn required<'r>(
    record: &'r StringRecord,
    headers: &HashMap<String, usize>,
    name: &str,
) -> Result<&'r str, String> {
    field(record, headers, name).ok_or_else(|| format!("missing required field '{}'", name))
}

/// Split a multi-value genre cell on `,` `;` `|`
fn split_genres(raw: &str) -> Vec<String> {
    raw.split([',', ';', '|'])
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse one song row. Headers: title, artist, code, genre, language,
/// indexed, popularity.
pub fn parse_song(record: &StringRecord, headers: &HashMap<String, usize>) -> Result<Song, String> {
    let title = required(record, headers, "title")?;
    let artist = required(record, headers, "artist")?;
    // Unparseable codes fall through to 0, which shares the rejection
    // with an explicit 0: zero is not a usable natural key.
    let code: i64 = required(record, headers, "code")?.parse().unwrap_or(0);
    if code == 0 {
        return Err("field 'code' must be a non-zero integer".to_string());
    }

    let genres = split_genres(required(record, headers, "genre")?);
    if genres.is_empty() {
        return Err("field 'genre' must name at least one genre".to_string());
    }
    let language = required(record, headers, "language")?;

    let indexed = match field(record, headers, "indexed") {
        Some(v) => v.eq_ignore_ascii_case("true"),
        None => true,
    };
    let popularity = field(record, headers, "popularity")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    Ok(Song {
        id: None,
        title: title.to_string(),
        artist: artist.to_string(),
        code,
        genres,
        language: language.to_string(),
        indexed,
        popularity: Song::clamp_popularity(popularity),
        created_at: chrono::Utc::now(),
    })
}

/// Parse one product row. Headers: nombre, precio, categoria, estado,
/// cantidad, imagenurl. The legacy status value "disponible" is normalized
/// to the stored "available".
pub fn parse_product(
    record: &StringRecord,
    headers: &HashMap<String, usize>,
) -> Result<Product, String> {
    let name = required(record, headers, "nombre")?;
    let price: Decimal = required(record, headers, "precio")?
        .parse()
        .map_err(|_| "field 'precio' must be a decimal number".to_string())?;
    if price <= Decimal::ZERO {
        return Err("field 'precio' must be greater than zero".to_string());
    }
    let category = required(record, headers, "categoria")?;

    let status = match field(record, headers, "estado") {
        Some(v) if v.eq_ignore_ascii_case("disponible") => STATUS_AVAILABLE.to_string(),
        Some(v) => v.to_lowercase(),
        None => STATUS_AVAILABLE.to_string(),
    };
    let stock: i64 = field(record, headers, "cantidad")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let image_url = field(record, headers, "imagenurl").map(str::to_string);

    Ok(Product {
        id: None,
        name: name.to_string(),
        category: category.to_string(),
        price,
        image_url,
        stock,
        status,
        created_at: chrono::Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    fn song_headers() -> HashMap<String, usize> {
        header_map(&record(&[
            "title",
            "artist",
            "code",
            "genre",
            "language",
            "indexed",
            "popularity",
        ]))
    }

    fn product_headers() -> HashMap<String, usize> {
        header_map(&record(&[
            "nombre",
            "precio",
            "categoria",
            "estado",
            "cantidad",
            "imagenURL",
        ]))
    }

    #[test]
    fn song_row_parses_with_multi_genre() {
        let headers = song_headers();
        let row = record(&[
            "La Vida",
            "Artista",
            "42",
            "rock, pop",
            "es",
            "TRUE",
            "150",
        ]);
        let song = parse_song(&row, &headers).expect("parse");
        assert_eq!(song.code, 42);
        assert_eq!(song.genres, vec!["rock", "pop"]);
        assert!(song.indexed);
        // over-range popularity is clamped
        assert_eq!(song.popularity, 100);
    }

    #[test]
    fn song_row_without_code_fails() {
        let headers = song_headers();
        let row = record(&["La Vida", "Artista", "", "rock", "es", "true", "10"]);
        let err = parse_song(&row, &headers).expect_err("missing code");
        assert!(err.contains("code"));
    }

    #[test]
    fn song_row_with_zero_code_fails() {
        let headers = song_headers();
        let row = record(&["La Vida", "Artista", "0", "rock", "es", "true", "10"]);
        let err = parse_song(&row, &headers).expect_err("zero code");
        assert!(err.contains("code"));

        // unparseable codes collapse to the same rejection
        let row = record(&["La Vida", "Artista", "abc", "rock", "es", "true", "10"]);
        assert!(parse_song(&row, &headers).is_err());
    }

    #[test]
    fn unparseable_popularity_defaults_to_zero() {
        let headers = song_headers();
        let row = record(&["La Vida", "Artista", "7", "rock", "es", "true", "n/a"]);
        let song = parse_song(&row, &headers).expect("row still imports");
        assert_eq!(song.popularity, 0);
    }

    #[test]
    fn product_row_normalizes_disponible() {
        let headers = product_headers();
        let row = record(&["Agua", "1.50", "bebidas", "Disponible", "24", ""]);
        let product = parse_product(&row, &headers).expect("parse");
        assert_eq!(product.status, STATUS_AVAILABLE);
        assert_eq!(product.price, dec!(1.50));
        assert_eq!(product.stock, 24);
        assert!(product.image_url.is_none());
    }

    #[test]
    fn product_row_with_bad_price_fails() {
        let headers = product_headers();
        let row = record(&["Agua", "gratis", "bebidas", "disponible", "1", ""]);
        assert!(parse_product(&row, &headers).is_err());
    }

    #[test]
    fn product_row_with_zero_price_fails() {
        let headers = product_headers();
        let row = record(&["Agua", "0", "bebidas", "disponible", "1", ""]);
        let err = parse_product(&row, &headers).expect_err("zero price");
        assert!(err.contains("precio"));
    }

    #[test]
    fn unparseable_stock_defaults_to_zero() {
        let headers = product_headers();
        let row = record(&["Agua", "1.50", "bebidas", "disponible", "muchas", ""]);
        let product = parse_product(&row, &headers).expect("row still imports");
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn headers_match_case_insensitively() {
        let headers = header_map(&record(&["Nombre", "PRECIO", "Categoria"]));
        let row = record(&["Agua", "2.00", "bebidas"]);
        let product = parse_product(&row, &headers).expect("parse");
        assert_eq!(product.name, "Agua");
    }
}
