quantity!(WattHours, "Wh", 1);
