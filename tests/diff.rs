mod tests {
    use led_fanout::diff::{
        DiffEncoder, MAX_PACKET_LEN, MAX_RECORDS_PER_PACKET, Record, changed_indices,
        check_strip_len, decode_records,
    };
    use led_fanout::{Error, Rgb};

    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    fn sent(pixels: &[Rgb]) -> Vec<Option<Rgb>> {
        pixels.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_single_change_is_one_record() {
        let previous = sent(&[BLACK; 3]);
        let pixels = [RED, BLACK, BLACK];

        let mut encoder = DiffEncoder::new();
        let packets = encoder.encode(&pixels, &previous).unwrap();

        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].as_slice(), &[0, 255, 0, 0]);
    }

    #[test]
    fn test_no_change_is_no_packet() {
        let pixels = [RED, BLACK, RED];
        let previous = sent(&pixels);

        let mut encoder = DiffEncoder::new();
        assert!(encoder.encode(&pixels, &previous).unwrap().is_empty());
    }

    #[test]
    fn test_never_sent_pixels_count_as_changed() {
        let pixels = [BLACK; 4];
        let previous = [None; 4];
        let indices: Vec<usize> = changed_indices(&pixels, &previous).collect();
        assert_eq!(indices, [0, 1, 2, 3]);
    }

    #[test]
    fn test_any_channel_difference_counts() {
        let previous = sent(&[Rgb::new(10, 20, 30); 3]);
        let pixels = [
            Rgb::new(10, 20, 30),
            Rgb::new(10, 20, 31),
            Rgb::new(11, 20, 30),
        ];
        let indices: Vec<usize> = changed_indices(&pixels, &previous).collect();
        assert_eq!(indices, [1, 2]);
    }

    #[test]
    fn test_full_strip_splits_into_packets() {
        let pixels: Vec<Rgb> = (0..=255u8).map(|i| Rgb::new(i, 255 - i, 7)).collect();
        let previous = vec![None; pixels.len()];

        let mut encoder = DiffEncoder::new();
        let packets = encoder.encode(&pixels, &previous).unwrap();

        // ceil(256 / 126)
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0].len(), MAX_PACKET_LEN);
        assert_eq!(packets[1].len(), MAX_PACKET_LEN);
        assert_eq!(packets[2].len(), 4 * (256 - 2 * MAX_RECORDS_PER_PACKET));

        let records: Vec<Record> = packets
            .iter()
            .flat_map(|packet| decode_records(packet))
            .collect();
        let indices: Vec<usize> = records.iter().map(|r| usize::from(r.index)).collect();
        assert_eq!(indices, (0..256).collect::<Vec<_>>());
        for record in records {
            assert_eq!(record.color, pixels[usize::from(record.index)]);
        }
    }

    #[test]
    fn test_sparse_changes_keep_index_order() {
        let mut pixels = vec![BLACK; 200];
        let previous = sent(&pixels);
        for i in (0..200).step_by(3) {
            pixels[i] = RED;
        }

        let mut encoder = DiffEncoder::new();
        let packets = encoder.encode(&pixels, &previous).unwrap();
        let indices: Vec<u8> = packets
            .iter()
            .flat_map(|packet| decode_records(packet))
            .map(|record| record.index)
            .collect();
        let expected: Vec<u8> = (0..200u8).step_by(3).collect();
        assert_eq!(packets.len(), 1);
        assert_eq!(indices, expected);
    }

    #[test]
    fn test_encode_full_ignores_previous() {
        let pixels = [BLACK; 5];
        let mut encoder = DiffEncoder::new();
        let packets = encoder.encode_full(&pixels).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(decode_records(&packets[0]).count(), 5);
    }

    #[test]
    fn test_strip_too_long() {
        assert!(check_strip_len(256).is_ok());
        assert!(matches!(
            check_strip_len(257),
            Err(Error::StripTooLong { len: 257, max: 256 })
        ));

        let pixels = vec![BLACK; 300];
        let previous = vec![None; 300];
        let mut encoder = DiffEncoder::new();
        assert!(matches!(
            encoder.encode(&pixels, &previous),
            Err(Error::StripTooLong { .. })
        ));
    }

    #[test]
    fn test_record_bytes() {
        let record = Record {
            index: 42,
            color: Rgb::new(1, 2, 3),
        };
        assert_eq!(record.to_bytes(), [42, 1, 2, 3]);
        assert_eq!(Record::from_bytes([42, 1, 2, 3]), record);
        assert_eq!(decode_records(&[9, 8, 7, 6, 5]).count(), 1);
    }
}
