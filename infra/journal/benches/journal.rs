use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use stride_domain::{EnrollmentError, ErrorCode};
use stride_journal::{ErrorJournal, JsonFileSink, MemorySink, NullSink};
use tempfile::TempDir;

// ============================================================================
// Benchmark: Recording into a full ring buffer
// ============================================================================

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");

    let journals = [
        ("null_sink", ErrorJournal::builder().sink(NullSink).build()),
        ("memory_sink", ErrorJournal::builder().sink(MemorySink::default()).build()),
    ];

    for (name, journal) in journals {
        for n in 0..journal.capacity() {
            journal.record(EnrollmentError::new(ErrorCode::NetworkError, format!("warmup {n}")), "details");
        }

        group.bench_function(name, |b| {
            b.iter(|| {
                black_box(journal.record(
                    EnrollmentError::new(ErrorCode::PaymentFailed, "gateway declined"),
                    "payment",
                ));
            });
        });
    }

    let temp = TempDir::new().unwrap();
    let file_journal = ErrorJournal::builder().sink(JsonFileSink::new(temp.path(), "bench")).build();
    group.sample_size(20);
    group.bench_function("json_file_sink", |b| {
        b.iter(|| {
            black_box(file_journal.record(
                EnrollmentError::new(ErrorCode::ServerError, "503 upstream"),
                "review",
            ));
        });
    });

    group.finish();
}

// ============================================================================
// Benchmark: Queries
// ============================================================================

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    group.bench_function("stats_full_buffer", |b| {
        b.iter_batched(
            || {
                let journal = ErrorJournal::builder().build();
                for n in 0..100 {
                    let code = if n % 2 == 0 { ErrorCode::InvalidOtp } else { ErrorCode::ServerError };
                    journal.record(EnrollmentError::new(code, "seed"), "otp");
                }
                journal
            },
            |journal| black_box(journal.stats()),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_record, bench_queries);
criterion_main!(benches);
