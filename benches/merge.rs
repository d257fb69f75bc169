use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use metakit::{DateTime, GpsInfo, LangAlt, MetaValue, MultiString, Raw, Tag, Text};

fn parse_datetime(c: &mut Criterion) {
    let tag = Tag::parse("Xmp.photoshop.DateCreated").unwrap();
    let raw = Raw::Text("2020-05-17T10:30:09.25+02:00".to_string());
    c.bench_function("parse_datetime", |b| {
        b.iter(|| DateTime::from_raw(black_box(&raw), black_box(&tag)))
    });
}

fn parse_gps(c: &mut Criterion) {
    let tag = Tag::parse("Xmp.exif.GPSLatitude").unwrap();
    let raw = Raw::Text("51,30.50123456N".to_string());
    c.bench_function("parse_gps_coordinate", |b| {
        b.iter(|| metakit::Latitude::from_raw(black_box(&raw), black_box(&tag)))
    });
}

fn merge_strings(c: &mut Criterion) {
    let tag = Tag::parse("Xmp.dc.title").unwrap();
    let a = Text::new("a fairly long caption describing the scene");
    let b = Text::new("a different caption from another source");
    c.bench_function("merge_text_conflict", |bench| {
        bench.iter(|| black_box(&a).merge("bench", &tag, black_box(&b)))
    });
}

fn merge_keywords(c: &mut Criterion) {
    let tag = Tag::parse("Iptc.Application2.Keywords").unwrap();
    let a = MultiString::new((0..20).map(|i| format!("keyword {}", i)));
    let b = MultiString::new((10..30).map(|i| format!("keyword {}", i)));
    c.bench_function("merge_keyword_lists", |bench| {
        bench.iter(|| black_box(&a).merge("bench", &tag, black_box(&b)))
    });
}

fn merge_lang_alt(c: &mut Criterion) {
    let tag = Tag::parse("Xmp.dc.description").unwrap();
    let a = LangAlt::from_pairs([("en-GB", "Cat"), ("fr", "Chat"), ("de", "Katze")], None);
    let b = LangAlt::from_pairs([("x-default", "Cat"), ("es", "Gato")], None);
    c.bench_function("merge_lang_alt", |bench| {
        bench.iter(|| black_box(&a).merge("bench", &tag, black_box(&b)))
    });
}

fn merge_gps(c: &mut Criterion) {
    let tag = Tag::parse("Exif.GPSInfo.GPSInfo").unwrap();
    let a = GpsInfo::new(
        None,
        None,
        metakit::Latitude::from_degrees("51.508333"),
        metakit::Longitude::from_degrees("-0.125"),
    );
    let raw = a.to_exif();
    let b = GpsInfo::from_raw(&raw, &tag).unwrap().unwrap();
    c.bench_function("merge_gps_records", |bench| {
        bench.iter(|| black_box(&a).merge("bench", &tag, black_box(&b)))
    });
}

criterion_group!(
    benches,
    parse_datetime,
    parse_gps,
    merge_strings,
    merge_keywords,
    merge_lang_alt,
    merge_gps
);
criterion_main!(benches);
