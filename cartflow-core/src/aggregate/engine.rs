use super::*;

/// Group `records` by the spec's field tuple and reduce the metric per group.
///
/// Groups are collected in first-encounter order, which is also the
/// tie-break order after the descending sort (the sort is stable). A record
/// whose metric field is absent or non-numeric contributes nothing to its
/// group's reduction; the group itself still exists. An empty batch yields
/// an empty result.
///
/// Fails if the spec is invalid or a record lacks one of the `group_by`
/// fields.
pub fn aggregate<R: Tabular>(
    records: &[R],
    spec: &AggregateSpec,
) -> Result<Vec<GroupRow>, AggregateError> {
    spec.validate()?;

    // Partition in first-encounter order: the map holds slot indexes into
    // the ordered group vector.
    let mut slots: AHashMap<Vec<Value>, usize> = AHashMap::new();
    let mut groups: Vec<(Vec<Value>, Option<i64>)> = Vec::new();

    for record in records {
        let mut key = Vec::with_capacity(spec.group_by.len());
        for field in &spec.group_by {
            let value = record
                .field(field)
                .ok_or_else(|| AggregateError::MissingGroupField(field.clone()))?;
            key.push(value);
        }

        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = groups.len();
                slots.insert(key.clone(), slot);
                groups.push((key, spec.reducer.identity()));
                slot
            }
        };

        if let Some(value) = record.field(&spec.metric).and_then(|v| v.as_int()) {
            let acc = &mut groups[slot].1;
            *acc = spec.reducer.fold(*acc, value);
        }
    }

    let rows: Vec<GroupRow> = groups
        .into_iter()
        .map(|(key, acc)| GroupRow {
            key,
            total: acc.unwrap_or(0),
        })
        .collect();

    Ok(match &spec.rank_within {
        None => rank_global(rows, spec.top_n),
        Some(field) => {
            let rank_pos = spec
                .group_by
                .iter()
                .position(|f| f == field)
                .ok_or_else(|| AggregateError::RankKeyNotGrouped(field.clone()))?;
            rank_per_partition(rows, rank_pos, spec.top_n)
        }
    })
}

/// Sort all groups descending by reduced value and truncate to the top N.
fn rank_global(mut rows: Vec<GroupRow>, top_n: Option<usize>) -> Vec<GroupRow> {
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    if let Some(n) = top_n {
        rows.truncate(n);
    }
    rows
}

/// Split groups by the key component at `rank_pos`, rank each partition
/// descending, keep the top N per partition, and emit partitions in
/// first-encounter order of the partition value.
fn rank_per_partition(
    rows: Vec<GroupRow>,
    rank_pos: usize,
    top_n: Option<usize>,
) -> Vec<GroupRow> {
    let mut slots: AHashMap<Value, usize> = AHashMap::new();
    let mut partitions: Vec<Vec<GroupRow>> = Vec::new();

    for row in rows {
        let partition_key = row.key[rank_pos].clone();
        let slot = *slots.entry(partition_key).or_insert_with(|| {
            partitions.push(Vec::new());
            partitions.len() - 1
        });
        partitions[slot].push(row);
    }

    let mut out = Vec::new();
    for mut partition in partitions {
        partition.sort_by(|a, b| b.total.cmp(&a.total));
        if let Some(n) = top_n {
            partition.truncate(n);
        }
        out.extend(partition);
    }
    out
}
