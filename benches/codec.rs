use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gpp_codec::sections::Section;
use gpp_codec::v1::{GPPContainer, GPPString, encode};

const GPP_US_SECTIONS: &str = "DBADLO8~BSJgmkoZJSA.YA~BSFgmiU~BWJYJllA~BSFgmSZQ.YA";
const US_VA: &str = "bSFgmiU";

fn bench_container_parse(c: &mut Criterion) {
    c.bench_function("container_parse", |b| {
        b.iter(|| {
            let parsed = GPPContainer::parse(black_box(GPP_US_SECTIONS)).unwrap();
            black_box(parsed);
        });
    });
}

fn bench_us_va_decode(c: &mut Criterion) {
    c.bench_function("us_va_decode", |b| {
        b.iter(|| {
            let section: gpp_codec::sections::usva::UsVa =
                black_box(US_VA).parse().unwrap();
            black_box(section);
        });
    });
}

fn bench_encode(c: &mut Criterion) {
    let (container, _) = GPPContainer::parse(GPP_US_SECTIONS).unwrap();
    let sections: Vec<Section> = container.sections;
    c.bench_function("encode", |b| {
        b.iter(|| {
            let s = encode(black_box(&sections)).unwrap();
            black_box(s);
        });
    });
}

fn bench_gpp_string_parse(c: &mut Criterion) {
    c.bench_function("gpp_string_parse", |b| {
        b.iter(|| {
            let gpp = GPPString::parse_str(black_box(GPP_US_SECTIONS)).unwrap();
            black_box(gpp);
        });
    });
}

criterion_group!(
    benches,
    bench_container_parse,
    bench_us_va_decode,
    bench_encode,
    bench_gpp_string_parse
);
criterion_main!(benches);
