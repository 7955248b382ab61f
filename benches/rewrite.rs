//! Parse and rewrite throughput on a synthetic old-grammar script.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use elvish_upgrade::parser::parse;
use elvish_upgrade::rewrite;

const BLOCK: &str = "fn show [x]{
  if eq $x ''; then
    echo empty
  elif has-prefix $x -; then
    echo flag $x
  else
    echo value $x
  fi
}

for f in *.elv $@rest; do
  try
    show (cat $f)
  except e
    echo failed $f
  tried
done

while ?(test -f lock); do sleep 1; done
a=1 {b,c}=(put 2 3)
";

/// Build a script of `n` repetitions of a mixed block.
fn synthetic_script(n: usize) -> String {
    BLOCK.repeat(n)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for n in [1, 100] {
        let source = synthetic_script(n);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(format!("{}_blocks", n), |b| {
            b.iter(|| parse("bench.elv", black_box(&source)))
        });
    }
    group.finish();
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    for n in [1, 100] {
        let source = synthetic_script(n);
        let tree = match parse("bench.elv", &source) {
            Ok(tree) => tree,
            Err(diag) => panic!("benchmark script does not parse: {}", diag),
        };
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(format!("{}_blocks", n), |b| {
            b.iter(|| rewrite(black_box(&tree)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_rewrite);
criterion_main!(benches);
