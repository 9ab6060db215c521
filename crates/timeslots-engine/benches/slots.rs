use chrono::NaiveDateTime;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use timeslots_engine::Calendar;

fn office_calendar(cache_size: usize) -> Calendar {
    let mut calendar = Calendar::new();
    calendar.set_cache_size(cache_size);
    calendar
        .add_open_rules(["p=540-720,780-1080;wd=1-5", "p=540-720;wd=6"])
        .expect("valid open rules");
    calendar
        .add_close_rules([
            "p=0-1440;sd=easter,easterMonday,ascension,pentecost",
            "p=0-1440;bd=0101,0501,0714,1225",
            "p=960-1080;d=20140401-20140430",
        ])
        .expect("valid close rules");
    calendar
}

fn bench_month_of_slots(c: &mut Criterion) {
    let begin = NaiveDateTime::parse_from_str("2014-04-01 08:00", "%Y-%m-%d %H:%M").unwrap();
    let end = NaiveDateTime::parse_from_str("2014-05-01 18:00", "%Y-%m-%d %H:%M").unwrap();

    let mut group = c.benchmark_group("month_of_slots");
    for cache_size in [0usize, 64] {
        group.bench_function(format!("cache_{}", cache_size), |b| {
            b.iter(|| {
                // Fresh calendar per iteration so the per-day state starts cold.
                let mut calendar = office_calendar(cache_size);
                black_box(calendar.get_time_slots_of_days(black_box(begin), black_box(end), true))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_month_of_slots);
criterion_main!(benches);
