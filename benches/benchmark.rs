//! Benchmarks for csv2influx
//!
//! Run with: cargo bench

use std::io::Cursor;
use std::time::Instant;

use csv2influx::{
    convert_csv, ColumnSpec, ConversionConfig, Converter, EncoderConfig, FieldType,
    LineProtocolEncoder, Row, Validation, WriterSink,
};

fn report(count: usize, elapsed: std::time::Duration) {
    let rows_per_sec = count as f64 / elapsed.as_secs_f64();
    println!(
        "  {:>7} rows: {:>8.2}ms ({:>10.0} rows/sec)",
        count,
        elapsed.as_secs_f64() * 1000.0,
        rows_per_sec
    );
}

fn build_csv(count: usize) -> String {
    let mut input = String::from("host,region,usage,count,note,ok\n");
    for i in 0..count {
        input.push_str(&format!(
            "web{},eu-{},{}.{},{},\"load, {}\",{}\n",
            i % 50,
            i % 3,
            i,
            i % 100,
            i,
            i,
            i % 2 == 0
        ));
    }
    input
}

fn bench_encoder() {
    println!("\n1. Encoder (2 tags, 4 fields)");
    println!("{:-<60}", "");

    let config = EncoderConfig::new(
        "cpu",
        vec![
            ColumnSpec::tag("host"),
            ColumnSpec::tag("region"),
            ColumnSpec::field("usage", FieldType::Float),
            ColumnSpec::field("count", FieldType::Int),
            ColumnSpec::field("note", FieldType::String),
            ColumnSpec::field("ok", FieldType::Bool),
        ],
    )
    .unwrap();
    let encoder = LineProtocolEncoder::new(config);

    let mut row = Row::new();
    row.insert("host".to_string(), "web 1".to_string());
    row.insert("region".to_string(), "eu-west".to_string());
    row.insert("usage".to_string(), "12.5".to_string());
    row.insert("count".to_string(), "42".to_string());
    row.insert("note".to_string(), "said \"hi\"".to_string());
    row.insert("ok".to_string(), "true".to_string());

    for &count in &[10_000, 100_000, 1_000_000] {
        let mut line = String::new();
        let start = Instant::now();
        for _ in 0..count {
            line.clear();
            encoder.encode_into(&row, &mut line).unwrap();
        }
        report(count, start.elapsed());
    }
}

fn bench_convert(title: &str, validation: Validation, parallel: bool) {
    println!("\n{}", title);
    println!("{:-<60}", "");

    for &count in &[1_000, 10_000, 100_000] {
        let input = build_csv(count);
        let config = ConversionConfig {
            validation,
            ..ConversionConfig::from_specs(
                "cpu",
                Some("host,region"),
                "usage:float,count:int,note:str,ok:bool",
            )
            .unwrap()
        };
        let converter = Converter::new(config).with_parallel(parallel);
        let mut sink = WriterSink::new(Vec::with_capacity(input.len() * 2));

        let start = Instant::now();
        converter.convert(Cursor::new(input), &mut sink).unwrap();
        report(count, start.elapsed());
    }
}

fn bench_star_tags() {
    println!("\n5. Wide rows with '*' tags (50 tag columns)");
    println!("{:-<60}", "");

    let labels: Vec<String> = (0..50).map(|i| format!("t{}", i)).collect();
    for &count in &[1_000, 10_000] {
        let mut input = format!("{},v\n", labels.join(","));
        for i in 0..count {
            let values: Vec<String> = (0..50).map(|j| format!("x{}", (i + j) % 10)).collect();
            input.push_str(&format!("{},{}\n", values.join(","), i));
        }

        let config = ConversionConfig::from_specs("wide", Some("*"), "v:int").unwrap();
        let mut output = Vec::new();

        let start = Instant::now();
        convert_csv(Cursor::new(input), &mut output, config).unwrap();
        report(count, start.elapsed());
    }
}

fn main() {
    println!("csv2influx Benchmarks\n");
    println!("{:=<60}", "");

    bench_encoder();
    bench_convert("2. Convert (sequential)", Validation::Lenient, false);
    bench_convert("3. Convert (parallel batches)", Validation::Lenient, true);
    bench_convert("4. Convert (parallel, strict)", Validation::Strict, true);
    bench_star_tags();

    println!("\n{:=<60}", "");
    println!("Benchmarks complete.");
}
