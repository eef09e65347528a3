use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// A 1-D integer tensor holding the given values
pub fn int_1d<B: Backend>(values: &[i64], device: &B::Device) -> Tensor<B, 1, Int> {
    Tensor::from_data(
        Data::new(
            values.iter().map(|&v| v.elem()).collect(),
            Shape::new([values.len()]),
        ),
        device,
    )
}

/// Lookup ids as `i64`, reading any id at or past `rows` as `unk`
pub fn lookup_ids(ids: &[usize], rows: usize, unk: usize, table: &str) -> Vec<i64> {
    ids.iter()
        .map(|&id| {
            if id < rows {
                id as i64
            } else {
                log::warn!(
                    "{} id {} is outside a lookup table of {} rows, using UNK",
                    table,
                    id,
                    rows
                );
                unk as i64
            }
        })
        .collect()
}

/// A single-column float tensor, one row per value
pub fn float_column<B: Backend>(values: &[f32], device: &B::Device) -> Tensor<B, 2> {
    Tensor::from_data(
        Data::new(
            values.iter().map(|&v| v.elem()).collect(),
            Shape::new([values.len(), 1]),
        ),
        device,
    )
}

/// Pad each row of values out to `seq_length`, filling the remainder with `pad_value`
pub fn pad_to<B: Backend>(
    pad_value: i64,
    rows: Vec<Vec<i64>>,
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = rows.len();

    let mut tensor = Tensor::zeros([batch_size, seq_length], device);
    tensor = tensor.add_scalar(pad_value);

    for (index, row) in rows.into_iter().enumerate() {
        let row_length = row.len().min(seq_length);
        if row_length == 0 {
            continue;
        }

        tensor = tensor.slice_assign(
            [index..index + 1, 0..row_length],
            Tensor::from_data(
                Data::new(
                    row.into_iter().take(row_length).map(|v| v.elem()).collect(),
                    Shape::new([1, row_length]),
                ),
                device,
            ),
        );
    }

    tensor
}
